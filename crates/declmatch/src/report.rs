//! Human-readable rendering of match errors.

use crate::error::{MatchError, Slot};
use declmatch_value::Value;
use similar::{ChangeTag, TextDiff};
use std::io;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

/// Writes match errors to a color-capable sink.
pub struct Report<W> {
    out: W,
}

impl<W: WriteColor> Report<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn set_color(&mut self, color: Color) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_fg(Some(color)))
    }

    fn set_bold(&mut self) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_bold(true))
    }

    fn set_dim(&mut self) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_dimmed(true))
    }

    fn reset(&mut self) -> io::Result<()> {
        self.out.reset()
    }

    pub fn write_errors(&mut self, errors: &[MatchError]) -> io::Result<()> {
        for error in errors {
            self.write_error(error)?;
        }

        self.set_bold()?;
        write!(self.out, "{} mismatch", errors.len())?;
        if errors.len() != 1 {
            write!(self.out, "es")?;
        }
        self.reset()?;
        writeln!(self.out)?;
        Ok(())
    }

    pub fn write_error(&mut self, error: &MatchError) -> io::Result<()> {
        self.set_bold()?;
        if error.path.is_root() {
            write!(self.out, "(root)")?;
        } else {
            write!(self.out, "{}", error.path)?;
        }
        self.reset()?;
        write!(self.out, ": ")?;
        self.set_color(Color::Red)?;
        writeln!(self.out, "{}", error.reason)?;
        self.reset()?;

        match (multiline(&error.expected), multiline(&error.actual)) {
            (Some(expected), Some(actual)) => self.write_diff(expected, actual)?,
            _ => {
                self.write_slot("expected", &error.expected)?;
                self.write_slot("actual", &error.actual)?;
            }
        }

        writeln!(self.out)?;
        Ok(())
    }

    fn write_slot(&mut self, label: &str, slot: &Slot) -> io::Result<()> {
        self.set_dim()?;
        write!(self.out, "  {:<10}", format!("{}:", label))?;
        self.reset()?;
        writeln!(self.out, "{}", slot)
    }

    pub fn write_diff(&mut self, expected: &str, actual: &str) -> io::Result<()> {
        let diff = TextDiff::from_lines(expected, actual);

        for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
            if idx > 0 {
                writeln!(self.out, "  ...")?;
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let (sign, color) = match change.tag() {
                        ChangeTag::Delete => ("-", Color::Red),
                        ChangeTag::Insert => ("+", Color::Green),
                        ChangeTag::Equal => (" ", Color::White),
                    };

                    self.set_color(color)?;
                    write!(self.out, "  {}{}", sign, change.value())?;
                    self.reset()?;
                    if change.missing_newline() {
                        writeln!(self.out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn multiline(slot: &Slot) -> Option<&str> {
    match slot.as_value() {
        Some(Value::String(s)) if s.contains('\n') => Some(s),
        _ => None,
    }
}

/// Renders `errors` to a string, with ANSI colors when `color` is set.
pub fn render(errors: &[MatchError], color: bool) -> String {
    let buffer = if color {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    let mut report = Report::new(buffer);
    if let Err(e) = report.write_errors(errors) {
        // In-memory buffers do not fail; keep the plain listing regardless.
        tracing::debug!(error = %e, "failed to render report");
        return errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
    }
    String::from_utf8_lossy(report.into_inner().as_slice()).into_owned()
}
