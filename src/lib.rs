pub mod assembler;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod release;
pub mod scraper;
pub mod server;
pub mod service;
pub mod settings;
pub mod store;
pub mod summarizer;
pub mod tracker;

pub use error::{RelnotesError, Result};

#[cfg(test)]
pub mod test_helpers;
