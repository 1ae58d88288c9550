mod line_map;
mod parser;
mod state;
mod tokenizer;

pub(crate) use line_map::LineMap;
pub(crate) use parser::{ParsedSample, parse};
pub(crate) use state::ParserState;
