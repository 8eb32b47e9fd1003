//! Application layer: command line, configuration and subcommand handlers

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;
pub mod startup;
