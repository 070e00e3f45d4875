pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod idempotency;
pub mod infra;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod types;
