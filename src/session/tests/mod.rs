//! Test modules for the scan session

pub mod helpers;
