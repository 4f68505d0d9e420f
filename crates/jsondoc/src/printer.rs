//! Terminal diagnostics printer
//!
//! Formats collected diagnostics for the terminal, with optional colored
//! severity labels.
//!
//! # Example
//!
//! ```no_run
//! use jsondoc::diagnostics::Diagnostic;
//! use jsondoc::printer::DiagnosticPrinter;
//!
//! let diagnostics = vec![Diagnostic::warning("cannot link gone.Thing")];
//! DiagnosticPrinter::new(&diagnostics, true).print_to_stderr();
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Diagnostics printer
pub struct DiagnosticPrinter<'a> {
    /// Diagnostics to print
    diagnostics: &'a [Diagnostic],
    /// Whether to use colored output
    use_color: bool,
}

impl<'a> DiagnosticPrinter<'a> {
    /// Create a new printer
    pub fn new(diagnostics: &'a [Diagnostic], use_color: bool) -> Self {
        Self {
            diagnostics,
            use_color,
        }
    }

    /// Print to stderr, colored when the terminal supports it
    pub fn print_to_stderr(&self) {
        let choice = if self.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stderr = StandardStream::stderr(choice);
        if let Err(e) = self.write_colored(&mut stderr) {
            eprintln!("Error printing diagnostics: {}", e);
        }
    }

    /// Write with colors to a WriteColor implementor
    pub fn write_colored<W: WriteColor>(&self, w: &mut W) -> io::Result<()> {
        for diagnostic in self.diagnostics {
            write!(w, "{}", diagnostic.location())?;

            w.set_color(&severity_color(diagnostic.severity))?;
            write!(w, "{}", diagnostic.severity.display())?;
            if let Some(code) = &diagnostic.code {
                write!(w, "[{}]", code)?;
            }
            w.reset()?;

            writeln!(w, ": {}", diagnostic.message)?;
        }
        w.flush()
    }
}

impl Display for DiagnosticPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for diagnostic in self.diagnostics {
            writeln!(f, "{}", diagnostic.format())?;
        }
        Ok(())
    }
}

fn severity_color(severity: DiagnosticSeverity) -> ColorSpec {
    let mut spec = ColorSpec::new();
    match severity {
        DiagnosticSeverity::Error => spec.set_fg(Some(Color::Red)).set_bold(true),
        DiagnosticSeverity::Warning => spec.set_fg(Some(Color::Yellow)).set_bold(true),
        DiagnosticSeverity::Info => spec.set_fg(Some(Color::Cyan)),
    };
    spec
}
