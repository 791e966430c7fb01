pub mod config;
pub mod error;
pub mod grid;
pub mod infra;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod rollup;
pub mod store;
pub mod sync;
