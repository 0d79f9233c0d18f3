//! Text-generation agent invocation.
//!
//! The agent is an external CLI (Claude Code by default). Tailor only needs
//! two things from it: a print mode that writes one document to stdout, and
//! an interactive mode that can talk to an MCP stdio server.

use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tailor_core::{AgentConfig, Application, SessionContext, prompt};
use tokio::process::Command;
use tracing::{debug, info};

/// Name the session server is registered under in the agent's MCP config.
pub const MCP_SERVER_NAME: &str = "tailor";

/// One single-shot generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: Option<String>,
}

/// Something that turns a prompt into a document.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentError>;
}

/// Runs the configured agent command as a subprocess.
#[derive(Debug, Clone)]
pub struct CliAgent {
    command: String,
    args: Vec<String>,
}

impl CliAgent {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }

    fn base_command(&self, model: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        if let Some(model) = model {
            cmd.arg("--model").arg(model);
        }
        cmd
    }

    /// Builds the interactive invocation:
    /// `<command> <args> [--model M] <prompt> --mcp-config <json>`.
    ///
    /// The prompt precedes `--mcp-config` because the agent parses that flag
    /// as variadic and would swallow a trailing prompt as a second config.
    fn interactive_command(
        &self,
        ctx: &SessionContext,
        tailor_exe: &Path,
    ) -> Result<Command, AgentError> {
        let token = ctx.encode()?;
        let mut cmd = self.base_command(ctx.model.as_deref());
        cmd.arg(prompt::interactive_prompt(ctx))
            .arg("--mcp-config")
            .arg(mcp_config_json(tailor_exe, &token));
        Ok(cmd)
    }

    /// Starts an interactive session wired to `tailor serve` and waits for it.
    ///
    /// The agent inherits the terminal; the session server runs as the
    /// agent's own child process.
    pub async fn run_interactive(
        &self,
        ctx: &SessionContext,
        tailor_exe: &Path,
    ) -> Result<ExitStatus, AgentError> {
        let mut cmd = self.interactive_command(ctx, tailor_exe)?;
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        info!(command = %self.command, app_dir = %ctx.app_dir.display(), "Launching interactive session");
        cmd.status().await.map_err(|source| AgentError::Spawn {
            command: self.command.clone(),
            source,
        })
    }
}

impl TextGenerator for CliAgent {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentError> {
        let mut cmd = self.base_command(request.model.as_deref());
        cmd.arg("-p")
            .arg(&request.prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(command = %self.command, model = ?request.model, "Running agent in print mode");
        let output = cmd.output().await.map_err(|source| AgentError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(AgentError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AgentError::EmptyOutput);
        }
        Ok(text)
    }
}

/// MCP client config pointing the agent at `<tailor_exe> serve --context <token>`.
pub fn mcp_config_json(tailor_exe: &Path, token: &str) -> String {
    let server = json!({
        "command": tailor_exe.display().to_string(),
        "args": ["serve", "--context", token],
    });
    let mut servers = serde_json::Map::new();
    servers.insert(MCP_SERVER_NAME.to_string(), server);
    json!({ "mcpServers": servers }).to_string()
}

/// Runs one optimization pass and stores the result as the next revision.
pub async fn optimize_once<G: TextGenerator>(
    generator: &G,
    app: &Application,
    resume: &str,
    ats: bool,
    model: Option<String>,
) -> anyhow::Result<PathBuf> {
    let job = app.job_text()?;
    let request = GenerationRequest {
        prompt: prompt::optimization_prompt(resume, &job, ats),
        model,
    };
    let mut text = generator.generate(&request).await?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(app.write_revision(&text)?)
}

/// Agent invocation failures.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Failed to start agent '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Agent exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("Agent produced no output")]
    EmptyOutput,

    #[error(transparent)]
    Context(#[from] tailor_core::ContextError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeGenerator {
        reply: String,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_mcp_config_json() {
        let config = mcp_config_json(Path::new("/usr/bin/tailor"), "abc_-123");
        let value: serde_json::Value = serde_json::from_str(&config).unwrap();

        let server = &value["mcpServers"]["tailor"];
        assert_eq!(server["command"], "/usr/bin/tailor");
        assert_eq!(server["args"], json!(["serve", "--context", "abc_-123"]));
    }

    #[tokio::test]
    async fn test_optimize_once_writes_revision() {
        let temp = TempDir::new().unwrap();
        let app_dir = temp.path().join("acme");
        fs::create_dir(&app_dir).unwrap();
        fs::write(app_dir.join("job.txt"), "Rust engineer").unwrap();
        fs::write(app_dir.join("resume_v1.md"), "old").unwrap();
        let app = Application::at(&app_dir);
        let generator = FakeGenerator {
            reply: "# Tailored".to_string(),
            seen: Mutex::new(Vec::new()),
        };

        let path = optimize_once(&generator, &app, "# Base", true, Some("opus".to_string()))
            .await
            .unwrap();

        assert_eq!(path, app_dir.join("resume_v2.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Tailored\n");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model.as_deref(), Some("opus"));
        assert!(seen[0].prompt.contains("Rust engineer"));
        assert!(seen[0].prompt.contains("# Base"));
        assert!(seen[0].prompt.contains("applicant tracking"));
    }

    #[tokio::test]
    async fn test_optimize_once_missing_job() {
        let temp = TempDir::new().unwrap();
        let app = Application::at(temp.path());
        let generator = FakeGenerator {
            reply: "unused".to_string(),
            seen: Mutex::new(Vec::new()),
        };

        let result = optimize_once(&generator, &app, "# Base", false, None).await;

        assert!(result.is_err());
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cli_agent_spawn_failure() {
        let agent = CliAgent {
            command: "definitely-not-an-installed-agent-binary".to_string(),
            args: Vec::new(),
        };
        let request = GenerationRequest {
            prompt: "hi".to_string(),
            model: None,
        };

        let result = agent.generate(&request).await;
        assert!(matches!(result, Err(AgentError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_agent_captures_stdout() {
        let agent = CliAgent {
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "printf '\\n# From agent\\n\\n'".to_string(),
                "agent".to_string(),
            ],
        };
        let request = GenerationRequest {
            prompt: "ignored".to_string(),
            model: None,
        };

        assert_eq!(agent.generate(&request).await.unwrap(), "# From agent");
    }

    fn session_context(app_dir: &Path, model: Option<&str>) -> SessionContext {
        SessionContext {
            app_dir: app_dir.to_path_buf(),
            resume: "# Jane".to_string(),
            job: "Rust engineer".to_string(),
            ats: false,
            model: model.map(str::to_string),
        }
    }

    #[test]
    fn test_interactive_command_puts_prompt_before_mcp_config() {
        let agent = CliAgent {
            command: "claude".to_string(),
            args: vec!["--verbose".to_string()],
        };
        let ctx = session_context(Path::new("/p/applications/acme"), Some("opus"));

        let cmd = agent
            .interactive_command(&ctx, Path::new("/usr/bin/tailor"))
            .unwrap();
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args.len(), 6, "{args:?}");
        assert_eq!(args[..3], ["--verbose", "--model", "opus"]);
        assert_eq!(args[3], prompt::interactive_prompt(&ctx));
        assert_eq!(args[4], "--mcp-config");
        assert_eq!(
            args[5],
            mcp_config_json(Path::new("/usr/bin/tailor"), &ctx.encode().unwrap())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_interactive_argv_order() {
        let temp = TempDir::new().unwrap();
        let argv_file = temp.path().join("argv");
        // $0 is the capture file; every remaining argument is written NUL-separated
        let agent = CliAgent {
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "printf '%s\\0' \"$@\" > \"$0\"".to_string(),
                argv_file.display().to_string(),
            ],
        };
        let ctx = session_context(temp.path(), None);

        let status = agent
            .run_interactive(&ctx, Path::new("/usr/bin/tailor"))
            .await
            .unwrap();

        assert!(status.success());
        let captured = fs::read_to_string(&argv_file).unwrap();
        let argv: Vec<&str> = captured.trim_end_matches('\0').split('\0').collect();
        assert_eq!(argv.len(), 3, "{argv:?}");
        assert!(argv[0].contains("<job_description>"));
        assert_eq!(argv[1], "--mcp-config");
        let config: serde_json::Value = serde_json::from_str(argv[2]).unwrap();
        assert_eq!(config["mcpServers"]["tailor"]["args"][0], "serve");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cli_agent_nonzero_exit() {
        let agent = CliAgent {
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo quota exceeded >&2; exit 3".to_string(),
                "agent".to_string(),
            ],
        };
        let request = GenerationRequest {
            prompt: "ignored".to_string(),
            model: None,
        };

        match agent.generate(&request).await {
            Err(AgentError::Failed { stderr, .. }) => assert_eq!(stderr, "quota exceeded"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
