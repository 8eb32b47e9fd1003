//! Decoder API
//!
//! Public surface of the decoder module for the scan session and the CLI.

pub use crate::decoder::adapter::{is_image_path, DecoderAdapter};
pub use crate::decoder::error::{DecodeError, DecodeResult};
pub use crate::decoder::qr::{QrDecoder, RqrrDecoder};
pub use crate::decoder::source::{
    DeviceLease, FrameDirectorySource, FrameFeed, VideoSource, DEFAULT_FRAME_INTERVAL,
};
pub use crate::decoder::subscription::DecodeSubscription;
pub use crate::decoder::types::{Frame, FrameDecode, ScanPayload};
