//! Terminal output helpers.

use tailor_core::Application;

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wraps `text` in `color` when colors are on.
pub fn paint(text: &str, color: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{color}{text}{}", colors::RESET)
    } else {
        text.to_string()
    }
}

/// Prints a success line, e.g. `✓ Created applications/acme`.
pub fn print_success(message: &str, use_colors: bool) {
    println!("{} {}", paint("✓", colors::GREEN, use_colors), message);
}

/// Prints a warning line to stderr.
pub fn print_warning(message: &str, use_colors: bool) {
    eprintln!("{} {}", paint("!", colors::YELLOW, use_colors), message);
}

/// One row of `tailor list`.
pub fn format_application_row(app: &Application, name_width: usize, use_colors: bool) -> String {
    let (count, latest) = match app.revisions() {
        Ok(revisions) => {
            let latest = revisions
                .last()
                .and_then(|r| r.path.file_name())
                .map_or_else(|| "-".to_string(), |n| n.to_string_lossy().into_owned());
            (revisions.len().to_string(), latest)
        }
        Err(_) => ("?".to_string(), "-".to_string()),
    };

    let name = format!("{:<width$}", app.name(), width = name_width);
    format!(
        "{}  {:>3}  {}",
        paint(&name, colors::CYAN, use_colors),
        count,
        paint(&latest, colors::DIM, use_colors)
    )
}

/// Header for `tailor list`.
pub fn format_list_header(name_width: usize, use_colors: bool) -> String {
    let header = format!("{:<width$}  REV  LATEST", "APPLICATION", width = name_width);
    paint(&header, colors::BOLD, use_colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_paint() {
        assert_eq!(paint("x", colors::GREEN, false), "x");
        assert_eq!(paint("x", colors::GREEN, true), "\x1b[32mx\x1b[0m");
    }

    #[test]
    fn test_format_application_row() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("acme");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("resume_v1.md"), "").unwrap();
        fs::write(dir.join("resume_v3.md"), "").unwrap();

        let row = format_application_row(&Application::at(&dir), 8, false);
        assert_eq!(row, "acme        2  resume_v3.md");
    }

    #[test]
    fn test_format_application_row_without_revisions() {
        let temp = TempDir::new().unwrap();
        let row = format_application_row(&Application::at(temp.path()), 1, false);
        assert!(row.ends_with("  0  -"));
    }
}
