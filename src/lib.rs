//! coinlens library
//!
//! Exposes the core fetch/cache/derive pipeline and the CLI parser for use
//! in integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod fetch_task;
pub mod range;
pub mod ui;
