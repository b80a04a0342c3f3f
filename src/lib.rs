//! Todo JSON API with interchangeable in-memory and SQLite storage.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
