//! Status output on stderr.
//!
//! Everything the user sees while a command runs goes through [`Shell`], so
//! stdout stays reserved for the generated interface.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    /// Default: status messages, spinner for slow steps
    #[default]
    Normal,
    /// --verbose: status messages and debug logs, no spinner
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Added,
    Finished,

    // In-progress statuses (cyan)
    Cloning,
    Reading,
    Patching,
    Building,
    Preprocessing,
    Generating,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Added => "Added",
            Status::Finished => "Finished",
            Status::Cloning => "Cloning",
            Status::Reading => "Reading",
            Status::Patching => "Patching",
            Status::Building => "Building",
            Status::Preprocessing => "Preprocessing",
            Status::Generating => "Generating",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Added | Status::Finished => "\x1b[1;32m",
            Status::Cloning
            | Status::Reading
            | Status::Patching
            | Status::Building
            | Status::Preprocessing
            | Status::Generating => "\x1b[1;36m",
        }
    }
}

/// Right-aligned width of the status word.
const STATUS_WIDTH: usize = 13;

/// Central shell for all CLI status output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
    interactive: bool,
}

impl Shell {
    /// Create a new shell.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let interactive = io::stderr().is_terminal();
        let use_color = match color {
            ColorChoice::Auto => interactive,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
            interactive,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    /// A shell that prints no statuses and never colors.
    pub fn quiet() -> Self {
        Shell {
            verbosity: Verbosity::Quiet,
            use_color: false,
            interactive: false,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print a status message.
    ///
    /// Format: `{status:>13} {message}`. Nothing is printed in quiet mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Start a timed step.
    ///
    /// The status line is printed immediately. On an interactive terminal in
    /// normal verbosity a spinner runs until the span is finished or dropped.
    pub fn span(&self, status: Status, msg: impl Display) -> Span {
        let message = msg.to_string();
        let spinner = if self.verbosity == Verbosity::Normal && self.interactive {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(format!("{} {}", status.as_str(), message));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            self.status(status, &message);
            None
        };

        Span {
            shell: self.clone(),
            status,
            message,
            start: Instant::now(),
            spinner,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// A timed step started by [`Shell::span`].
pub struct Span {
    shell: Shell,
    status: Status,
    message: String,
    start: Instant,
    spinner: Option<ProgressBar>,
}

impl Span {
    /// Finish the step and report how long it took.
    pub fn finish(mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
            self.shell.status(self.status, &self.message);
        }
        if self.shell.is_verbose() {
            self.shell.status(
                Status::Finished,
                format!(
                    "{} in {}",
                    self.status.as_str().to_lowercase(),
                    format_duration(self.start.elapsed())
                ),
            );
        }
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

/// Format a duration in a human-readable way.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        let shell = Shell::from_flags(false, false, ColorChoice::Never);
        assert_eq!(shell.verbosity(), Verbosity::Normal);

        let shell = Shell::from_flags(false, true, ColorChoice::Never);
        assert!(shell.is_verbose());

        // Quiet takes precedence
        let shell = Shell::from_flags(true, true, ColorChoice::Never);
        assert!(shell.is_quiet());
    }

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("Always".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("sometimes".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::from_flags(false, false, ColorChoice::Never);

        let formatted = shell.format_status(Status::Preprocessing);
        assert_eq!(formatted, "Preprocessing");

        let formatted = shell.format_status(Status::Added);
        assert_eq!(formatted.trim(), "Added");
        assert_eq!(formatted.len(), STATUS_WIDTH);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
