//! Search-interest decomposition: fetch a keyword's interest-over-time series,
//! clean it, infer its seasonal period, split it with robust STL and export
//! the components as a table.

pub mod analyzer;
pub mod config;
pub mod exporter;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod preflight;
pub mod provider;
pub mod storage;
pub mod utils;

pub use pipeline::Pipeline;
