//! # tailor-cli
//!
//! Binary entry point for Tailor.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Project initialization via `tailor init`
//! - Application folders via `tailor new` and `tailor list`
//! - Optimization passes via `tailor optimize` (single-shot or interactive)
//! - The agent-facing session server via `tailor serve`
//! - Theme bookkeeping via `tailor theme`

mod agent;
mod display;
mod theme_cli;

use agent::{CliAgent, optimize_once};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use display::{colors, print_success, print_warning};
use std::io::{IsTerminal, stdout};
use std::path::{Path, PathBuf};
use tailor_core::{
    APPLICATIONS_DIR, CONFIG_FILE_NAME, Config, Project, SessionContext, SessionServer,
    VersionError, folder_name_for, fs as tfs,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `TAILOR_LOG=debug`.
const LOG_ENV_VAR: &str = "TAILOR_LOG";

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Tailor - job-specific resume revisions driven by an AI agent
#[derive(Parser, Debug)]
#[command(name = "tailor", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    // ─────────────────────────────────────────────────────────────────────────
    // Global options (available for all subcommands)
    // ─────────────────────────────────────────────────────────────────────────
    /// Path to tailor.yml. Overrides TAILOR_CONFIG and walk-up discovery.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tailor.yml and the applications/ directory here
    Init(InitArgs),

    /// Create an application folder from a job description
    New(NewArgs),

    /// List applications and their revisions
    List,

    /// Print the path of an application's latest revision
    Latest(LatestArgs),

    /// Produce a new resume revision for an application
    Optimize(OptimizeArgs),

    /// Serve the save_resume tool on stdio for an interactive session
    #[command(hide = true)]
    Serve(ServeArgs),

    /// Manage installed themes
    Theme(theme_cli::ThemeArgs),
}

/// Arguments for the init subcommand.
#[derive(Parser, Debug)]
struct InitArgs {
    /// Base resume path, relative to the project root
    #[arg(long, default_value = "resume.md")]
    base_resume: String,

    /// Default theme identifier
    #[arg(long, default_value = "even")]
    theme: String,

    /// Default model identifier for the agent
    #[arg(long)]
    model: Option<String>,

    /// Overwrite existing tailor.yml if present
    #[arg(long)]
    force: bool,
}

/// Arguments for the new subcommand.
#[derive(Parser, Debug)]
struct NewArgs {
    /// Job description file to copy into the application folder
    #[arg(short, long)]
    job: PathBuf,

    /// Folder name (mutually exclusive with --company/--role)
    #[arg(short, long, conflicts_with_all = ["company", "role"], required_unless_present_all = ["company", "role"])]
    name: Option<String>,

    /// Company name, combined with --role into the folder name
    #[arg(long, requires = "role")]
    company: Option<String>,

    /// Role title, combined with --company into the folder name
    #[arg(long, requires = "company")]
    role: Option<String>,
}

/// Arguments for the latest subcommand.
#[derive(Parser, Debug)]
struct LatestArgs {
    /// Application folder name
    application: String,
}

/// Arguments for the optimize subcommand.
#[derive(Parser, Debug)]
struct OptimizeArgs {
    /// Application folder name
    application: String,

    /// Optimize for applicant tracking systems
    #[arg(long)]
    ats: bool,

    /// Override the default model
    #[arg(short, long)]
    model: Option<String>,

    /// Open an interactive agent session that saves drafts as it goes
    #[arg(short, long)]
    interactive: bool,
}

/// Arguments for the serve subcommand.
#[derive(Parser, Debug)]
struct ServeArgs {
    /// Encoded session context
    #[arg(long)]
    context: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr: `serve` owns stdout for the protocol.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let use_colors = cli.color.should_use_colors();

    match cli.command {
        Commands::Init(args) => init_command(use_colors, args),
        Commands::New(args) => new_command(cli.config.as_deref(), use_colors, args),
        Commands::List => list_command(cli.config.as_deref(), use_colors),
        Commands::Latest(args) => latest_command(cli.config.as_deref(), args),
        Commands::Optimize(args) => {
            optimize_command(cli.config.as_deref(), use_colors, args).await
        }
        Commands::Serve(args) => serve_command(args).await,
        Commands::Theme(args) => {
            let config_path = resolve_config_path(cli.config.as_deref())?;
            theme_cli::execute(args, &config_path, use_colors)
        }
    }
}

/// Resolves the config path from the flag, `TAILOR_CONFIG`, or walk-up.
fn resolve_config_path(flag: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    tailor_core::find_with_overrides(flag, &cwd).with_context(|| {
        format!(
            "No {} found. Run `tailor init` in your project directory first.",
            CONFIG_FILE_NAME
        )
    })
}

/// Resolves and loads the project configuration.
fn load_project(flag: Option<&Path>) -> Result<(Config, Project)> {
    let config_path = resolve_config_path(flag)?;
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    debug!(path = %config_path.display(), "Using project config");
    Ok((config, Project::from_config_path(&config_path)))
}

fn init_command(use_colors: bool, args: InitArgs) -> Result<()> {
    let root = std::env::current_dir().context("Failed to read current directory")?;
    let config_path = root.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = Config::new(args.base_resume, args.theme);
    config.default_model = args.model;
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let project = Project::new(&root);
    tfs::create_dir_all(&project.applications_dir(), tfs::DEFAULT_DIR_MODE)
        .with_context(|| format!("Failed to create {APPLICATIONS_DIR}/"))?;

    print_success(&format!("Created {CONFIG_FILE_NAME}"), use_colors);

    let base_resume = config.resolve_base_resume(&root);
    if !tfs::exists(&base_resume) {
        print_warning(
            &format!(
                "Base resume {} does not exist yet; create it before running `tailor optimize`",
                base_resume.display()
            ),
            use_colors,
        );
    }
    Ok(())
}

fn new_command(config_flag: Option<&Path>, use_colors: bool, args: NewArgs) -> Result<()> {
    let (_config, project) = load_project(config_flag)?;

    let name = match (args.name, args.company, args.role) {
        (Some(name), _, _) => name,
        (None, Some(company), Some(role)) => folder_name_for(&company, &role),
        _ => bail!("Provide either --name or both --company and --role"),
    };

    let app = project.create_application(&name, &args.job)?;
    print_success(
        &format!("Created {}/{}", APPLICATIONS_DIR, app.name()),
        use_colors,
    );
    Ok(())
}

fn list_command(config_flag: Option<&Path>, use_colors: bool) -> Result<()> {
    let (_config, project) = load_project(config_flag)?;
    let apps = project.list_applications()?;

    if apps.is_empty() {
        println!("No applications yet. Create one with `tailor new`.");
        return Ok(());
    }

    let width = apps
        .iter()
        .map(|a| a.name().len())
        .max()
        .unwrap_or(0)
        .max("APPLICATION".len());
    println!("{}", display::format_list_header(width, use_colors));
    for app in &apps {
        println!("{}", display::format_application_row(app, width, use_colors));
    }
    Ok(())
}

fn latest_command(config_flag: Option<&Path>, args: LatestArgs) -> Result<()> {
    let (_config, project) = load_project(config_flag)?;
    let app = project.open_application(&args.application)?;

    match app.latest_revision() {
        Ok(revision) => {
            println!("{}", revision.path.display());
            Ok(())
        }
        Err(VersionError::NoVersions(_)) => bail!(
            "No revisions yet for '{}'. Run `tailor optimize {}` first.",
            app.name(),
            app.name()
        ),
        Err(e) => Err(e).context("Failed to read revisions"),
    }
}

async fn optimize_command(
    config_flag: Option<&Path>,
    use_colors: bool,
    args: OptimizeArgs,
) -> Result<()> {
    let (config, project) = load_project(config_flag)?;
    let app = project.open_application(&args.application)?;

    let resume_path = config.resolve_base_resume(project.root());
    let resume = std::fs::read_to_string(&resume_path)
        .with_context(|| format!("Failed to read base resume {}", resume_path.display()))?;
    let model = config
        .effective_model(args.model.as_deref())
        .map(str::to_string);
    let agent = CliAgent::from_config(&config.agent);

    if args.interactive {
        let ctx = SessionContext::for_application(&app, resume, args.ats, model)?;
        let exe = std::env::current_exe().context("Failed to locate the tailor executable")?;
        let before = app.revision_count()?;

        let status = agent.run_interactive(&ctx, &exe).await?;
        let saved = app.revision_count()?.saturating_sub(before);
        info!(%status, saved, "Interactive session ended");

        if !status.success() {
            bail!("Agent exited with {status}");
        }
        match app.latest_revision() {
            Ok(latest) if saved > 0 => print_success(
                &format!(
                    "Session saved {saved} revision(s); latest is {}",
                    latest.path.display()
                ),
                use_colors,
            ),
            _ => print_warning("Session ended without saving a revision", use_colors),
        }
        return Ok(());
    }

    let path = optimize_once(&agent, &app, &resume, args.ats, model).await?;
    print_success(
        &format!(
            "Wrote {}",
            display::paint(&path.display().to_string(), colors::CYAN, use_colors)
        ),
        use_colors,
    );
    Ok(())
}

async fn serve_command(args: ServeArgs) -> Result<()> {
    let ctx = SessionContext::decode(&args.context)
        .context("Session context is unusable; aborting session")?;
    let mut server = SessionServer::new(ctx);
    server.serve_stdio().await?;
    Ok(())
}
