use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use citemark_parser::{Document, Location, Reference, ReferenceEdge, Segment, Span};
use crossterm::style::Stylize;

use crate::{
    error::Error,
    samples::{LoadedFile, SampleInfo, load},
};

use super::ParserArgs;

/// Show the structure of the samples in a corpus file
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Corpus file, samples separated by `---` lines
    pub file: PathBuf,

    /// Only show this sample (counted from 1)
    #[arg(long, value_name = "N")]
    pub sample: Option<usize>,

    /// Dump the parsed documents as JSON instead of a tree
    #[arg(long)]
    pub json: bool,

    /// Show location information (line:column)
    #[arg(long)]
    pub show_locations: bool,

    /// Maximum depth to display (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_depth: usize,

    #[command(flatten)]
    pub parser: ParserArgs,
}

struct TreeWriter<W: Write> {
    writer: W,
    depth: usize,
    is_last_stack: Vec<bool>,
    show_locations: bool,
    max_depth: usize,
    /// Where the current sample starts in the file.
    sample: SampleInfo,
}

impl<W: Write> TreeWriter<W> {
    fn new(writer: W, show_locations: bool, max_depth: usize) -> Self {
        Self {
            writer,
            depth: 0,
            is_last_stack: Vec::new(),
            show_locations,
            max_depth,
            sample: SampleInfo {
                number: 0,
                line: 1,
                offset: 0,
            },
        }
    }

    fn should_show(&self) -> bool {
        self.max_depth == 0 || self.depth <= self.max_depth
    }

    fn print_tree_line(
        &mut self,
        name: &str,
        detail: Option<&str>,
        location: Option<&Location>,
    ) -> io::Result<()> {
        if !self.should_show() {
            return Ok(());
        }

        for i in 0..self.depth {
            let is_last = self.is_last_stack.get(i) == Some(&true);
            let prefix = match (i + 1 == self.depth, is_last) {
                (true, true) => "└─ ",
                (true, false) => "├─ ",
                (false, true) => "   ",
                (false, false) => "│  ",
            };
            write!(self.writer, "{prefix}")?;
        }

        write!(self.writer, "{}", name.cyan().bold())?;

        if let Some(d) = detail {
            write!(self.writer, ": {}", d.yellow())?;
        }

        if self.show_locations
            && let Some(location) = location
        {
            // positions are relative to the sample, shown relative to the file
            let mut location = location.clone();
            location.shift(self.sample.offset, self.sample.line);
            let loc_str = format!(
                " @{}:{} -> {}:{}",
                location.start.line, location.start.column, location.end.line, location.end.column
            );
            write!(self.writer, "{}", loc_str.dark_grey())?;
        }

        writeln!(self.writer)?;

        Ok(())
    }

    fn with_child<F>(&mut self, is_last: bool, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.is_last_stack.push(is_last);
        self.depth += 1;
        let result = f(self);
        self.is_last_stack.pop();
        self.depth -= 1;
        result
    }

    fn write_sample(&mut self, sample: SampleInfo, document: &Document) -> io::Result<()> {
        self.sample = sample;
        let title = format!("Sample {} (line {})", sample.number, sample.line);
        writeln!(self.writer, "{}", title.blue().bold())?;
        self.write_segments(document, &document.content)?;

        if !document.references.is_empty() {
            writeln!(self.writer, "{}", "References".blue())?;
            for edge in document.references.edges() {
                self.write_reference(document, edge)?;
            }
        }
        for finding in &document.findings {
            let line = format!("{}[{}] {}", finding.severity, finding.code, finding.message);
            if finding.is_error() {
                writeln!(self.writer, "{}", line.red())?;
            } else {
                writeln!(self.writer, "{}", line.magenta())?;
            }
        }
        Ok(())
    }

    fn write_segments(&mut self, document: &Document, segments: &[Segment]) -> io::Result<()> {
        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            self.with_child(is_last, |writer| writer.write_segment(document, segment))?;
        }
        Ok(())
    }

    fn write_segment(&mut self, document: &Document, segment: &Segment) -> io::Result<()> {
        match segment {
            Segment::Text(run) => {
                let preview = truncate(&run.content, 40);
                self.print_tree_line("Text", Some(&preview), Some(&run.location))
            }
            Segment::Unparsed(unparsed) => {
                let preview = truncate(&unparsed.raw, 40);
                self.print_tree_line("Unparsed", Some(&preview), Some(&unparsed.location))
            }
            Segment::Span(index) => match document.span(*index) {
                Some(span) => self.write_span(document, span),
                None => Ok(()),
            },
        }
    }

    fn write_span(&mut self, document: &Document, span: &Span) -> io::Result<()> {
        let mut detail = truncate(&span.text, 50);
        if let Some(span_type) = span.span_type {
            detail = format!("[{span_type}] {detail}");
        }
        self.print_tree_line(&span.label(), Some(&detail), Some(&span.location))?;
        self.write_segments(document, &span.content)
    }

    fn write_reference(&mut self, document: &Document, edge: &ReferenceEdge) -> io::Result<()> {
        let source = document
            .span(edge.source)
            .map_or_else(|| edge.source.to_string(), Span::label);
        let target = match &edge.reference {
            Reference::Resolved(index) => document
                .span(*index)
                .map_or_else(|| index.to_string(), Span::label)
                .green(),
            Reference::Root => "root text".to_string().green(),
            Reference::Dangling(id) => format!("\"{id}\" (dangling)").red(),
        };
        writeln!(self.writer, "  {source} {} -> {target}", edge.slot.to_string().cyan())
    }
}

/// Truncate text for display, counting characters rather than bytes.
fn truncate(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        format!("{text:?}")
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head:?}... ({count} chars)")
    }
}

/// The documents to show with where their samples sit, all of them or just the one asked for.
fn selected(file: &LoadedFile, sample: Option<usize>) -> Result<Vec<(SampleInfo, &Document)>, Error> {
    let all = file.samples.iter().copied().zip(&file.corpus.documents);
    match sample {
        None => Ok(all.collect()),
        Some(number) => {
            let found: Vec<_> = all.filter(|(info, _)| info.number == number).collect();
            if found.is_empty() {
                Err(Error::NoSuchSample {
                    path: file.path.clone(),
                    number,
                })
            } else {
                Ok(found)
            }
        }
    }
}

#[tracing::instrument(skip_all, fields(file = %args.file.display()))]
pub fn run(args: &Args) -> Result<ExitCode, Error> {
    let file = load(&args.file, &args.parser.options())?;
    let documents = selected(&file, args.sample)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let documents: Vec<&Document> = documents.iter().map(|(_, document)| *document).collect();
        serde_json::to_writer_pretty(&mut out, &documents)?;
        writeln!(out)?;
    } else {
        let mut writer = TreeWriter::new(&mut out, args.show_locations, args.max_depth);
        for (info, document) in documents {
            writer.write_sample(info, document)?;
        }
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
