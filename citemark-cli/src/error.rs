use std::{error::Error as _, io, path::PathBuf};

use citemark_parser::{Finding, Location};
use miette::{Diagnostic, NamedSource, SourceSpan};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", .path.display())]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write output")]
    Output(#[from] io::Error),

    #[error("failed to serialize output")]
    Json(#[from] serde_json::Error),

    #[error("{} has no sample {number}", .path.display())]
    NoSuchSample { path: PathBuf, number: usize },
}

/// Rich finding wrapper for miette display with source code
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic()]
pub(crate) struct RichFinding {
    message: String,

    #[help]
    advice: Option<String>,

    #[source_code]
    src: NamedSource<String>,

    #[label("{position_advice}")]
    span: SourceSpan,
    position_advice: String,
}

fn source_span_from_location(location: &Location) -> SourceSpan {
    let start_offset = location.absolute_start;
    let length = location.absolute_end.saturating_sub(location.absolute_start);

    SourceSpan::new(start_offset.into(), length)
}

/// Build a source-annotated report for a finding whose location is relative to the
/// whole file. Findings without a location have nothing to point at.
pub(crate) fn rich_report(finding: &Finding, path: &str, source: &str) -> Option<miette::Report> {
    let location = finding.location.as_ref()?;
    let line = location.start.line;
    let column = location.start.column;

    let rich = RichFinding {
        message: format!(
            "{}[{}] sample {}: {}",
            finding.severity, finding.code, finding.sample, finding.message
        ),
        advice: finding.advice().map(ToString::to_string),
        src: NamedSource::new(path, source.to_string()),
        span: source_span_from_location(location),
        position_advice: format!("found here (line {line}, column {column})"),
    };
    Some(miette::Report::new(rich))
}

/// Print a CLI error and its causes to stderr.
pub(crate) fn display(error: &Error) {
    eprintln!("Error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
