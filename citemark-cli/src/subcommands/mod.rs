use std::path::PathBuf;

use citemark_parser::Options;
use clap::ArgAction;
use rayon::prelude::*;

use crate::{
    error::Error,
    samples::{LoadedFile, load},
};

pub mod check;
pub mod inspect;
pub mod stats;

/// Parser settings shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ParserArgs {
    /// Flag samples longer than this many characters
    #[arg(long, value_name = "N", conflicts_with = "no_sample_limit")]
    pub max_sample_chars: Option<usize>,

    /// Never flag samples for their length
    #[arg(long)]
    pub no_sample_limit: bool,

    /// Accept an experimental attribute without warning (repeatable)
    #[arg(long = "allow-attribute", value_name = "NAME", action = ArgAction::Append)]
    pub allow_attributes: Vec<String>,
}

impl ParserArgs {
    pub fn options(&self) -> Options {
        let mut builder = Options::builder().with_extra_attributes(self.allow_attributes.iter().cloned());
        if let Some(limit) = self.max_sample_chars {
            builder = builder.with_max_sample_chars(limit);
        }
        if self.no_sample_limit {
            builder = builder.without_sample_limit();
        }
        builder.build()
    }
}

/// Read and parse every file in parallel. Results keep the order of `files`.
pub(crate) fn load_all(files: &[PathBuf], options: &Options) -> Vec<Result<LoadedFile, Error>> {
    files.par_iter().map(|file| load(file, options)).collect()
}
