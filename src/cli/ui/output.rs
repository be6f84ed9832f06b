use console::style;

/// Styled status lines.
///
/// Commands whose stdout carries data (a diff, a prompt) report on stderr so
/// the output can be piped.
pub struct Output {
    stderr: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { stderr: false }
    }

    /// Status lines go to stderr
    pub fn diagnostics() -> Self {
        Self { stderr: true }
    }

    fn emit(&self, line: String) {
        if self.stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(format!("{} {}", style("✓").green(), message));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(format!("{} {}", style("⚠").yellow(), message));
    }

    pub fn info(&self, message: &str) {
        self.emit(format!("{} {}", style("ℹ").blue(), message));
    }

    pub fn header(&self, message: &str) {
        self.emit(format!("\n{}", style(message).bold().underlined()));
    }

    pub fn section(&self, message: &str) {
        self.emit(format!("\n{}", style(message).bold()));
        self.emit("─".repeat(40));
    }

    /// Aligned `label: value` row
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        self.emit(format!("  {:<18} {}", format!("{}:", label), value));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
