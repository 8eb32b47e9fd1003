//! QR decoder adapter
//!
//! Normalises two kinds of input into the same result shape:
//!
//! - **Continuous decode**: a [`VideoSource`] delivers frames; each frame is
//!   decoded off the event loop and reported through a [`DecodeSubscription`]
//!   stream as either a payload or a "no code in this frame" signal.
//! - **Still image**: one asynchronous attempt on an uploaded image, which
//!   must be recognisable image data before the decoder is invoked.
//!
//! The decode routine itself sits behind the [`QrDecoder`] trait.

pub mod adapter;
pub mod api;
pub mod error;
pub mod qr;
pub mod source;
pub mod subscription;
pub mod types;

pub use adapter::DecoderAdapter;
pub use error::{DecodeError, DecodeResult};
pub use qr::{QrDecoder, RqrrDecoder};
pub use source::{DeviceLease, FrameDirectorySource, FrameFeed, VideoSource};
pub use subscription::DecodeSubscription;
pub use types::{Frame, FrameDecode, ScanPayload};

#[cfg(test)]
pub(crate) mod tests;
