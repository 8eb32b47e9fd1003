//! CLI unit tests
