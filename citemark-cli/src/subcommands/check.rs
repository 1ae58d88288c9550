use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use citemark_parser::Finding;
use clap::ValueEnum;
use serde::Serialize;

use crate::{
    error::{self, Error},
    samples::LoadedFile,
};

use super::{ParserArgs, load_all};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Report markup problems in corpus files
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Corpus files, samples separated by `---` lines
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Exit with a failure status if any error finding is reported
    #[arg(long)]
    pub strict: bool,

    /// Render findings with source snippets on stderr
    #[arg(long, conflicts_with = "format")]
    pub rich: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    samples: usize,
    findings: &'a [Finding],
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Summary {
    files: usize,
    samples: usize,
    errors: usize,
    warnings: usize,
}

impl Summary {
    fn add(&mut self, file: &LoadedFile) {
        self.files += 1;
        self.samples += file.corpus.stats.samples;
        self.errors += file.corpus.stats.errors;
        self.warnings += file.corpus.stats.warnings;
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s), {} sample(s): {} error(s), {} warning(s)",
            self.files, self.samples, self.errors, self.warnings
        )
    }
}

#[tracing::instrument(skip_all, fields(files = args.files.len()))]
pub fn run(args: &Args) -> Result<ExitCode, Error> {
    let options = args.parser.options();
    let results = load_all(&args.files, &options);

    let mut summary = Summary::default();
    let mut failed_to_load = false;
    let mut loaded = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(file) => {
                summary.add(&file);
                loaded.push(file);
            }
            Err(e) => {
                error::display(&e);
                failed_to_load = true;
            }
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Text => {
            for file in &loaded {
                write_text(&mut out, file, args.rich)?;
            }
            writeln!(out, "{summary}")?;
        }
        Format::Json => {
            let findings: Vec<_> = loaded.iter().map(LoadedFile::located_findings).collect();
            let reports: Vec<_> = loaded
                .iter()
                .zip(&findings)
                .map(|(file, findings)| FileReport {
                    file: file.display_path(),
                    samples: file.corpus.stats.samples,
                    findings,
                })
                .collect();
            serde_json::to_writer_pretty(&mut out, &reports)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if failed_to_load || (args.strict && summary.errors > 0) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn write_text<W: Write>(out: &mut W, file: &LoadedFile, rich: bool) -> io::Result<()> {
    let path = file.display_path();
    for finding in file.located_findings() {
        if rich && let Some(report) = error::rich_report(&finding, &path, &file.source) {
            eprint!("{report:?}");
            continue;
        }
        writeln!(out, "{path}: {finding}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use citemark_parser::{Options, parse_corpus};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::samples::{SampleInfo, split};

    fn loaded(path: &str, source: &str) -> LoadedFile {
        let samples = split(source);
        let texts: Vec<&str> = samples.iter().map(|sample| sample.text).collect();
        LoadedFile {
            path: PathBuf::from(path),
            source: source.to_string(),
            samples: samples.iter().map(SampleInfo::from).collect(),
            corpus: parse_corpus(&texts, &Options::default()),
        }
    }

    #[test]
    fn text_output_prefixes_the_file() -> Result<(), Box<dyn std::error::Error>> {
        let file = loaded("a.txt", "ok\n---\n<title>x</title>\n");
        let mut out = Vec::new();
        write_text(&mut out, &file, false)?;
        let out = String::from_utf8(out)?;
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            vec!["a.txt: error[missing-id] sample 2, line: 3, column: 1: <title> tag has no id attribute"]
        );
        Ok(())
    }

    #[test]
    fn summary_counts_every_file() {
        let mut summary = Summary::default();
        summary.add(&loaded("a.txt", "<title>x</title>"));
        summary.add(&loaded("b.txt", "plain\n---\nplain"));
        assert_eq!(
            summary.to_string(),
            "2 file(s), 3 sample(s): 1 error(s), 0 warning(s)"
        );
    }
}
