pub mod app;
pub mod core;
pub mod dispatcher;
pub mod fetcher;
pub mod notifications;
pub mod queue;
pub mod reporter;
pub mod scanner;
pub mod service;
pub mod weights;
