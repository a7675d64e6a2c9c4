pub mod trends_parser;

pub use trends_parser::{parse_explore, parse_multiline, TimeseriesWidget};
