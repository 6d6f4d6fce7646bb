//! Colored terminal output for generation reports.
//!
//! Uses `termcolor` for cross-platform colored output and respects the
//! `NO_COLOR` environment variable.

use std::io::Write;

use husk_gen::{BatchReport, GenError};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Auto-detect color support, honoring `NO_COLOR`.
fn color_choice() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Report writer for `husk generate`.
pub struct CliOutput {
    stdout: StandardStream,
}

impl CliOutput {
    /// Writer bound to stdout.
    pub fn stdout() -> Self {
        Self {
            stdout: StandardStream::stdout(color_choice()),
        }
    }

    fn tag(&mut self, text: &str, color: Color) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(true);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{:>9}", text);
        let _ = self.stdout.reset();
    }

    /// One successfully generated root.
    pub fn generated(&mut self, root: &str) {
        self.tag("generated", Color::Green);
        let _ = writeln!(self.stdout, " {}", root);
    }

    /// One root skipped by the exclusion set.
    pub fn skipped(&mut self, root: &str) {
        self.tag("skipped", Color::Yellow);
        let _ = writeln!(self.stdout, " {}", root);
    }

    /// One failed root with its error.
    pub fn failed(&mut self, root: &str, error: &GenError) {
        self.tag("failed", Color::Red);
        let _ = writeln!(self.stdout, " {}: {}", root, error);
    }

    /// Closing one-line summary.
    pub fn summary(&mut self, report: &BatchReport) {
        let _ = writeln!(
            self.stdout,
            "{} generated, {} skipped, {} failed",
            report.generated.len(),
            report.skipped.len(),
            report.failed.len()
        );
    }
}
