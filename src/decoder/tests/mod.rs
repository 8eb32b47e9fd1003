//! Test modules for the decoder adapter

pub mod helpers;
