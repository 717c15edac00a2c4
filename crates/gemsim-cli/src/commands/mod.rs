//! Subcommand handlers

pub mod analyze;
pub mod catalog;
pub mod scenarios;
