//! Colored terminal output for check reports.
//!
//! Uses `termcolor`; respects `NO_COLOR` and the `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tyguard::TestResult;

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled output writer for terminal.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Red bold text.
    pub fn error(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Red), true);
    }

    /// Dim/gray text.
    pub fn dim(&mut self, text: &str) {
        self.write_styled(text, Some(Color::White), false);
    }

    /// Bold text.
    pub fn bold(&mut self, text: &str) {
        self.write_styled(text, None, true);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn badge(&mut self, label: &str, bg: Color) {
        let mut spec = ColorSpec::new();
        spec.set_bg(Some(bg)).set_fg(Some(Color::White)).set_bold(true);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, " {} ", label);
        let _ = self.stdout.reset();
    }

    /// " PASS " badge (green background, white text).
    pub fn pass_badge(&mut self) {
        self.badge("PASS", Color::Green);
    }

    /// " FAIL " badge (red background, white text).
    pub fn fail_badge(&mut self) {
        self.badge("FAIL", Color::Red);
    }

    /// Failure tree under a failed document, one description per line.
    ///
    /// Entries without a description are skipped; their children are
    /// printed at the same depth.
    pub fn failure_tree(&mut self, result: &TestResult, depth: usize) {
        let depth = match result.description() {
            Some(description) => {
                self.plain(&"  ".repeat(depth + 1));
                if result.failed().is_empty() {
                    self.error("✗ ");
                    self.plain(description);
                } else {
                    self.dim(description);
                }
                self.newline();
                depth + 1
            }
            None => depth,
        };
        for child in result.failed() {
            self.failure_tree(child, depth);
        }
    }

    /// Write error message to stderr.
    pub fn stderr_error(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = writeln!(self.stderr, "{}", text);
        let _ = self.stderr.reset();
    }
}
