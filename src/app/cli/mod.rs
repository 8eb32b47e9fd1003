//! Command-line interface: arguments and layered configuration

pub mod api;
pub mod args;
pub mod config;

#[cfg(test)]
mod tests;
