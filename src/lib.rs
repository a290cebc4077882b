//! Generic configuration loading library
//!
//! Resolves, scans, parses and merges database, query and endpoint
//! definitions from YAML files or a relational store.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod parser;
pub mod paths;
pub mod pattern;
pub mod resolve;
pub mod scanner;
pub mod startup;
pub mod types;
pub mod validate;
