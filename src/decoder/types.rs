//! Decoder data types

use std::fmt;

/// A single captured or uploaded picture
pub type Frame = image::DynamicImage;

/// Raw text decoded from a QR code, before interpretation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanPayload(String);

impl ScanPayload {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ScanPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ScanPayload {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for ScanPayload {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Result of decoding one frame of a live feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameDecode {
    Decoded(ScanPayload),
    /// No code in this frame; keep going
    NoCode,
}
