//! Prompts handed to the text-generation agent.

use crate::context::SessionContext;
use crate::session::SAVE_RESUME_TOOL;

const OPTIMIZE_PREAMBLE: &str = "You are an expert resume writer. Rewrite the resume below so it \
targets the job description that follows. Keep every fact truthful: reorder, rephrase and \
emphasize, but never invent employers, titles, dates, degrees or skills.";

const ATS_RULES: &str = "Optimize for applicant tracking systems: use standard section headings \
(Summary, Experience, Education, Skills), mirror the job description's exact keywords where they \
honestly apply, avoid tables, columns and images, and spell out acronyms once.";

const OUTPUT_RULES: &str = "Respond with the complete resume in Markdown and nothing else. Do not \
wrap it in code fences and do not add commentary.";

/// Prompt for a single-shot optimization pass.
pub fn optimization_prompt(resume: &str, job: &str, ats: bool) -> String {
    let mut prompt = String::with_capacity(resume.len() + job.len() + 1024);
    prompt.push_str(OPTIMIZE_PREAMBLE);
    prompt.push_str("\n\n");
    if ats {
        prompt.push_str(ATS_RULES);
        prompt.push_str("\n\n");
    }
    prompt.push_str(OUTPUT_RULES);
    push_sources(&mut prompt, resume, job);
    prompt
}

/// Prompt opening an interactive session.
///
/// The remote session persists drafts through the `save_resume` tool instead
/// of printing them.
pub fn interactive_prompt(ctx: &SessionContext) -> String {
    let mut prompt = String::with_capacity(ctx.resume.len() + ctx.job.len() + 1024);
    prompt.push_str(OPTIMIZE_PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(&session_instructions(ctx));
    push_sources(&mut prompt, &ctx.resume, &ctx.job);
    prompt
}

/// How the remote session is expected to use the write tool for `ctx`.
pub fn session_instructions(ctx: &SessionContext) -> String {
    let mut text = format!(
        "Work with the user interactively on the resume for the application in {}. Whenever \
you have a draft worth keeping, call the `{SAVE_RESUME_TOOL}` tool with the full Markdown \
resume as `content`. Each call stores a new numbered revision and returns its path; earlier \
revisions are never overwritten, so save as often as useful.",
        ctx.app_dir.display()
    );
    if ctx.ats {
        text.push_str("\n\n");
        text.push_str(ATS_RULES);
    }
    text
}

fn push_sources(prompt: &mut String, resume: &str, job: &str) {
    prompt.push_str("\n\n<resume>\n");
    prompt.push_str(resume.trim_end());
    prompt.push_str("\n</resume>\n\n<job_description>\n");
    prompt.push_str(job.trim_end());
    prompt.push_str("\n</job_description>\n");
}
