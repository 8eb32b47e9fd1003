//! Test modules for the backend client

pub mod helpers;
