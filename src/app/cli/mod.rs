//! Command-line interface and config file layer

pub mod args;
pub mod config;

pub use args::Args;

#[cfg(test)]
mod tests;
