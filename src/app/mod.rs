//! Application layer: command line, settings, HTTP server and startup

pub mod cli;
pub mod server;
pub mod settings;
pub mod startup;
