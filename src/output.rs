//! Status lines for the pxedit binary.
//!
//! Verbs are right-aligned and coloured like cargo's. Status goes to stderr
//! so swatch listings on stdout stay pipeable.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const VERB_COLUMN: usize = 12;

/// Colour of a status verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Progress,
    Caution,
    Highlight,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Progress => "\x1b[32m",
            Tone::Caution => "\x1b[33m",
            Tone::Highlight => "\x1b[36m",
        }
    }
}

/// Writes cargo-style status lines, coloured only when stderr is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Work starting, e.g. `    Scanning walk.png (64x16)`.
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Progress, verb, message);
    }

    /// Work finished.
    pub fn success(&self, verb: &str, message: &str) {
        self.line(Tone::Progress, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Caution, verb, message);
    }

    /// Highlight a path or value inside a message.
    pub fn cyan(&self, text: &str) -> String {
        self.paint(Tone::Highlight, text, false)
    }

    fn paint(&self, tone: Tone, text: &str, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let weight = if bold { BOLD } else { "" };
        format!("{weight}{}{text}{RESET}", tone.ansi())
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        let verb = format!("{verb:>VERB_COLUMN$}");
        let verb = self.paint(tone, &verb, true);
        let _ = writeln!(io::stderr().lock(), "{verb} {message}");
    }
}

/// `plural(1, "frame", "frames")` gives "1 frame"; any other count uses the
/// plural form.
pub fn plural(n: usize, singular: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { many })
}

/// `path` relative to the working directory when it lies inside it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}
