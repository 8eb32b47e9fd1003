//! rollcall: QR code attendance scanning against a student register API
//!
//! - [`decoder`] turns camera frames or uploaded images into QR payloads.
//! - [`session`] runs the scan state machine and records attendance.
//! - [`backend`] is the typed client of the register API.
//! - [`app`] is the command-line front end.

pub mod app;
pub mod backend;
pub mod core;
pub mod decoder;
pub mod session;
