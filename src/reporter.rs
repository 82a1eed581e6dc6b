//! Progress reporting for layer generation
//!
//! A [`Reporter`] is created once in `main` from the CLI flags and passed by
//! reference to every component that prints progress. Nothing in the crate
//! holds a global logger.
//!
//! Progress lines go to stdout in human mode and to stderr in JSON mode so the
//! JSON document on stdout stays parseable. Errors are always written to
//! stderr, even when progress output is disabled.
//!
//! # Examples
//!
//! ```
//! use layerpack::Reporter;
//!
//! let reporter = Reporter::human();
//! reporter.step("Parsing package specifications");
//! reporter.detail("Raw input", "requests==2.28.0");
//! reporter.success("Parsed 1 package");
//! ```

use crate::PackageSpec;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::{OwoColorize, Style};
use std::cell::Cell;
use std::time::Duration;

/// Where progress output is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Stdout,
    Stderr,
}

impl Output {
    fn color_stream(self) -> owo_colors::Stream {
        match self {
            Output::Stdout => owo_colors::Stream::Stdout,
            Output::Stderr => owo_colors::Stream::Stderr,
        }
    }
}

/// Explicit logging context for user-facing progress output
#[derive(Debug)]
pub struct Reporter {
    verbose: bool,
    output: Output,
    step_counter: Cell<u32>,
}

impl Reporter {
    pub fn new(verbose: bool, output: Output) -> Self {
        Self {
            verbose,
            output,
            step_counter: Cell::new(0),
        }
    }

    /// Reporter for interactive use: progress on stdout
    pub fn human() -> Self {
        Self::new(true, Output::Stdout)
    }

    /// Reporter for `--json` mode: progress on stderr, or none with `--quiet`
    pub fn json(quiet: bool) -> Self {
        Self::new(!quiet, Output::Stderr)
    }

    /// Reporter that prints nothing but errors
    pub fn silent() -> Self {
        Self::new(false, Output::Stderr)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Number of step headers printed so far
    pub fn steps(&self) -> u32 {
        self.step_counter.get()
    }

    fn emit(&self, line: &str) {
        match self.output {
            Output::Stdout => println!("{}", line),
            Output::Stderr => eprintln!("{}", line),
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        OwoColorize::if_supports_color(&text, self.output.color_stream(), |t| style.style(t))
            .to_string()
    }

    /// Numbered, timestamped step header
    pub fn step(&self, message: &str) {
        if !self.verbose {
            return;
        }
        let step = self.step_counter.get() + 1;
        self.step_counter.set(step);
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let header = format!("[{}] Step {}:", timestamp, step);
        self.emit("");
        self.emit(&format!(
            "🔄 {} {}",
            self.paint(&header, Style::new().bold().cyan()),
            message
        ));
    }

    pub fn info(&self, message: &str) {
        if !self.verbose {
            return;
        }
        self.emit(&format!("ℹ️  {}", message));
    }

    pub fn success(&self, message: &str) {
        if !self.verbose {
            return;
        }
        self.emit(&format!(
            "{} {}",
            self.paint("✓", Style::new().bold().green()),
            message
        ));
    }

    pub fn warning(&self, message: &str) {
        if !self.verbose {
            return;
        }
        self.emit(&format!(
            "{} {}",
            self.paint("⚠", Style::new().bold().yellow()),
            message
        ));
    }

    pub fn error(&self, message: &str) {
        let mark = OwoColorize::if_supports_color(&"✗", owo_colors::Stream::Stderr, |t| {
            Style::new().bold().red().style(t)
        });
        eprintln!("{} {}", mark, message);
    }

    pub fn progress(&self, message: &str, details: Option<&str>) {
        if !self.verbose {
            return;
        }
        match details {
            Some(details) => self.emit(&format!("⏳ {} ({})...", message, details)),
            None => self.emit(&format!("⏳ {}...", message)),
        }
    }

    /// Indented `key: value` line
    pub fn detail(&self, key: &str, value: &str) {
        if !self.verbose {
            return;
        }
        self.emit(&format!(
            "   {} {}",
            self.paint(&format!("{}:", key), Style::new().dimmed()),
            value
        ));
    }

    pub fn section(&self, title: &str) {
        if !self.verbose {
            return;
        }
        let rule = "=".repeat(50);
        self.emit("");
        self.emit(&rule);
        self.emit(&format!("🚀 {}", self.paint(title, Style::new().bold())));
        self.emit(&rule);
    }

    pub fn packages_summary(&self, packages: &[PackageSpec]) {
        if !self.verbose {
            return;
        }
        self.emit("");
        self.emit(&format!("📦 Packages to process ({}):", packages.len()));
        for (i, pkg) in packages.iter().enumerate() {
            self.emit(&format!("   {}. {}", i + 1, pkg));
        }
    }

    /// Spinner for a blocking operation; hidden when progress is disabled
    pub fn spinner(&self, message: String) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }

        let target = match self.output {
            Output::Stdout => ProgressDrawTarget::stdout(),
            Output::Stderr => ProgressDrawTarget::stderr(),
        };
        let pb = ProgressBar::with_draw_target(None, target);
        let template = "{spinner:.green} {msg} [{elapsed}]";
        if let Ok(style) = ProgressStyle::default_spinner().template(template) {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
