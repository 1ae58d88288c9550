use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use citemark_parser::{CorpusStats, SpanKind};
use crossterm::style::Stylize;
use serde::Serialize;

use crate::{
    error::{self, Error},
    samples::LoadedFile,
};

use super::{ParserArgs, load_all};

/// Summarize corpus files
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Corpus files, samples separated by `---` lines
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// A sample pointed at by file position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SampleRef {
    sample: usize,
    line: usize,
    chars: usize,
}

#[derive(Debug, Serialize)]
struct FileStats<'a> {
    file: String,
    #[serde(flatten)]
    stats: &'a CorpusStats,
    oversized_samples: Vec<SampleRef>,
    duplicate_samples: Vec<(&'a str, Vec<SampleRef>)>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    files: Vec<FileStats<'a>>,
    total: CorpusStats,
    positive_percent: f64,
    negative_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<citemark_parser::Balance>,
}

fn sample_ref(file: &LoadedFile, index: usize) -> Option<SampleRef> {
    let info = file.sample(index)?;
    let document = file.corpus.documents.get(index)?;
    Some(SampleRef {
        sample: info.number,
        line: info.line,
        chars: document.char_count(),
    })
}

impl<'a> FileStats<'a> {
    fn new(file: &'a LoadedFile) -> Self {
        let stats = &file.corpus.stats;
        Self {
            file: file.display_path(),
            stats,
            oversized_samples: stats
                .oversized
                .iter()
                .filter_map(|index| sample_ref(file, *index))
                .collect(),
            duplicate_samples: stats
                .duplicate_openings
                .iter()
                .map(|(word, indices)| {
                    let samples = indices
                        .iter()
                        .filter_map(|index| sample_ref(file, *index))
                        .collect();
                    (word.as_str(), samples)
                })
                .collect(),
        }
    }
}

impl<'a> Report<'a> {
    fn new(files: &'a [LoadedFile]) -> Self {
        let files: Vec<_> = files.iter().map(FileStats::new).collect();
        let mut total = CorpusStats::default();
        for file in &files {
            total.add_counts(file.stats);
        }
        Self {
            positive_percent: total.positive_percent(),
            negative_percent: total.negative_percent(),
            balance: total.balance(),
            files,
            total,
        }
    }

    fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let width = self
            .files
            .iter()
            .map(|file| file.file.chars().count())
            .chain(std::iter::once("TOTAL".len()))
            .max()
            .unwrap_or_default();

        writeln!(
            out,
            "{:<width$}  {:>7}  {:>14}  {:>17}  {:>10}",
            "File", "Total", "With <quote>", "Without <quote>", "Negative %"
        )?;
        writeln!(out, "{}", "-".repeat(width + 58))?;
        for file in &self.files {
            write_row(out, &file.file, file.stats, width)?;
        }
        writeln!(out, "{}", "-".repeat(width + 58))?;
        write_row(out, "TOTAL", &self.total, width)?;
        writeln!(out)?;

        writeln!(
            out,
            "Positive examples (with quotes): {:.1}%",
            self.positive_percent
        )?;
        writeln!(
            out,
            "Negative examples (without quotes): {:.1}%",
            self.negative_percent
        )?;
        if let Some(balance) = self.balance {
            writeln!(out, "Dataset is {}", balance.to_string().bold())?;
        }
        writeln!(out)?;

        writeln!(out, "{}", "Spans".cyan().bold())?;
        for kind in SpanKind::ALL {
            writeln!(out, "  {:<8}{}", kind, self.total.span_count(kind))?;
        }
        writeln!(
            out,
            "  {} error(s), {} warning(s)",
            self.total.errors, self.total.warnings
        )?;

        for file in &self.files {
            if file.oversized_samples.is_empty() && file.duplicate_samples.is_empty() {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "{}", file.file.as_str().cyan().bold())?;
            for sample in &file.oversized_samples {
                let line = format!(
                    "  sample {} (line {}) has {} characters",
                    sample.sample, sample.line, sample.chars
                );
                writeln!(out, "{}", line.yellow())?;
            }
            for (word, samples) in &file.duplicate_samples {
                let positions: Vec<String> = samples
                    .iter()
                    .map(|sample| format!("{} (line {})", sample.sample, sample.line))
                    .collect();
                writeln!(
                    out,
                    "  possible duplicates starting with \"{word}\": samples {}",
                    positions.join(", ")
                )?;
            }
        }
        Ok(())
    }
}

fn write_row<W: Write>(out: &mut W, name: &str, stats: &CorpusStats, width: usize) -> io::Result<()> {
    writeln!(
        out,
        "{name:<width$}  {:>7}  {:>14}  {:>17}  {:>9.1}%",
        stats.samples,
        stats.with_quotes,
        stats.without_quotes,
        stats.negative_percent()
    )
}

#[tracing::instrument(skip_all, fields(files = args.files.len()))]
pub fn run(args: &Args) -> Result<ExitCode, Error> {
    let options = args.parser.options();
    let mut failed_to_load = false;
    let loaded: Vec<LoadedFile> = load_all(&args.files, &options)
        .into_iter()
        .filter_map(|result| {
            result
                .map_err(|e| {
                    error::display(&e);
                    failed_to_load = true;
                })
                .ok()
        })
        .collect();

    let report = Report::new(&loaded);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        report.write_text(&mut out)?;
    }
    out.flush()?;

    Ok(if failed_to_load {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
