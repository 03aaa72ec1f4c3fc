use std::ops::Range;

use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use shapejson::Shape;

use crate::shape_expr::ShapeError;

/// The document being processed, as far as diagnostics are concerned.
pub struct Input {
    pub path: String,
    pub text: String,
    pub from_stdin: bool,
}

impl Input {
    /// Report an error located at `span` (in characters). Stdin has no file to point into, so
    /// its errors are printed as a single line.
    pub fn error(
        &self,
        span: Range<usize>,
        message: &str,
        note: Option<String>,
    ) -> anyhow::Result<()> {
        if self.from_stdin {
            eprintln!("error: {message} at offset {}", span.start);
            return Ok(());
        }

        // Keep labels inside the source, so errors at end of input point at the last character.
        let len = self.text.chars().count();
        let start = span.start.min(len.saturating_sub(1));
        let span = start..span.end.max(start + 1).min(len);

        let mut report = Report::build(ReportKind::Error, &self.path, span.start)
            .with_message(format!("failed to parse `{}`", self.path))
            .with_label(
                Label::new((&self.path, span))
                    .with_message(message)
                    .with_color(Color::Red),
            );
        if let Some(note) = note {
            report = report.with_note(note);
        }
        report
            .finish()
            .eprint((&self.path, Source::from(&self.text)))?;
        Ok(())
    }

    pub fn parse_error(&self, err: &shapejson::Error, shape: &Shape) -> anyhow::Result<()> {
        self.error(
            err.span().into_range(),
            &err.kind().to_string(),
            Some(format!("parsing against shape {}", shape.fg(Color::Cyan))),
        )
    }
}

pub fn shape_errors(src: &str, errors: &[ShapeError]) -> anyhow::Result<()> {
    let id = String::from("<shape>");
    for error in errors {
        Report::build(ReportKind::Error, &id, error.span.start)
            .with_message("invalid shape expression")
            .with_label(
                Label::new((&id, error.span.clone()))
                    .with_message(&error.message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((&id, Source::from(src)))?;
    }
    Ok(())
}
