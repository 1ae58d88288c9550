//! Splitting a corpus file into samples.
//!
//! A line whose trimmed content is `---` separates samples. Blank lines around a
//! sample are not part of it and blocks with nothing but whitespace are skipped.

use std::path::{Path, PathBuf};

use citemark_parser::{Corpus, Finding, Options, parse_corpus};

use crate::error::Error;

const SEPARATOR: &str = "---";

/// One sample of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sample<'a> {
    /// 1-based position among the file's samples.
    pub(crate) number: usize,
    /// 1-based line the sample starts on.
    pub(crate) line: usize,
    /// Byte offset of the sample in the file.
    pub(crate) offset: usize,
    pub(crate) text: &'a str,
}

pub(crate) fn split(source: &str) -> Vec<Sample<'_>> {
    let mut samples = Vec::new();
    let mut block: Vec<(usize, usize, &str)> = Vec::new();
    let mut offset = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        if line.trim() == SEPARATOR {
            push_block(source, &block, &mut samples);
            block.clear();
        } else {
            block.push((index + 1, offset, line));
        }
        offset += line.len();
    }
    push_block(source, &block, &mut samples);
    samples
}

fn push_block<'a>(source: &'a str, block: &[(usize, usize, &str)], samples: &mut Vec<Sample<'a>>) {
    let content: Vec<_> = block
        .iter()
        .filter(|(_, _, line)| !line.trim().is_empty())
        .collect();
    let (Some(&&(line, start, _)), Some(&&(_, last_offset, last_line))) =
        (content.first(), content.last())
    else {
        return;
    };
    let end = last_offset + last_line.trim_end_matches(['\n', '\r']).len();

    samples.push(Sample {
        number: samples.len() + 1,
        line,
        offset: start,
        text: source.get(start..end).unwrap_or_default(),
    });
}

/// Where a sample sits in its file, kept after the text has been parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SampleInfo {
    pub(crate) number: usize,
    pub(crate) line: usize,
    pub(crate) offset: usize,
}

impl From<&Sample<'_>> for SampleInfo {
    fn from(sample: &Sample<'_>) -> Self {
        Self {
            number: sample.number,
            line: sample.line,
            offset: sample.offset,
        }
    }
}

/// A corpus file, read, split and parsed.
#[derive(Debug)]
pub(crate) struct LoadedFile {
    pub(crate) path: PathBuf,
    pub(crate) source: String,
    pub(crate) samples: Vec<SampleInfo>,
    pub(crate) corpus: Corpus,
}

#[tracing::instrument(skip(options))]
pub(crate) fn load(path: &Path, options: &Options) -> Result<LoadedFile, Error> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8(bytes).map_err(|source| Error::Utf8 {
        path: path.to_path_buf(),
        source,
    })?;

    let samples = split(&source);
    tracing::debug!(samples = samples.len(), "split file");
    let texts: Vec<&str> = samples.iter().map(|sample| sample.text).collect();
    let corpus = parse_corpus(&texts, options);
    let samples = samples.iter().map(SampleInfo::from).collect();

    Ok(LoadedFile {
        path: path.to_path_buf(),
        source,
        samples,
        corpus,
    })
}

impl LoadedFile {
    pub(crate) fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// The sample behind a corpus index.
    pub(crate) fn sample(&self, index: usize) -> Option<&SampleInfo> {
        self.samples.get(index)
    }

    /// Findings with file positions: locations shifted to the file and sample numbers
    /// counted from 1, as shown to users.
    pub(crate) fn located_findings(&self) -> Vec<Finding> {
        self.corpus
            .findings
            .iter()
            .map(|finding| {
                let mut finding = finding.clone();
                if let Some(sample) = self.sample(finding.sample) {
                    finding.sample = sample.number;
                    if let Some(location) = &mut finding.location {
                        location.shift(sample.offset, sample.line);
                    }
                }
                finding
            })
            .collect()
    }
}
