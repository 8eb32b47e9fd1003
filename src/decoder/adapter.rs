//! Decoder adapter: one entry point for live feeds and still images

use crate::decoder::error::{DecodeError, DecodeResult};
use crate::decoder::qr::QrDecoder;
use crate::decoder::source::{FrameFeed, VideoSource};
use crate::decoder::subscription::DecodeSubscription;
use crate::decoder::types::{Frame, FrameDecode, ScanPayload};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Results buffered between the decode worker and the subscriber
const RESULT_BUFFER: usize = 8;

#[derive(Clone)]
pub struct DecoderAdapter {
    decoder: Arc<dyn QrDecoder>,
}

impl DecoderAdapter {
    pub fn new(decoder: Arc<dyn QrDecoder>) -> Self {
        Self { decoder }
    }

    /// Acquire `source` and decode its frames until the subscription stops
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_continuous_decode(
        &self,
        source: &dyn VideoSource,
    ) -> DecodeResult<DecodeSubscription> {
        let FrameFeed { mut frames, lease } = source.open()?;
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let decoder = self.decoder.clone();

        let worker = tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                let outcome = match frame {
                    Ok(frame) => Ok(decode_frame(decoder.clone(), frame).await),
                    Err(e) => Err(e),
                };
                let device_lost = outcome.is_err();
                if tx.send(outcome).await.is_err() || device_lost {
                    return;
                }
            }
            log::debug!("Frame feed ended");
        });

        Ok(DecodeSubscription::new(rx, lease, Some(worker)))
    }

    /// One decode attempt on an uploaded image
    ///
    /// Data that is not a recognised image format fails with
    /// [`DecodeError::InvalidInput`] before the decoder runs.
    pub async fn decode_still_image(&self, bytes: Vec<u8>) -> DecodeResult<ScanPayload> {
        let format = image::guess_format(&bytes)
            .map_err(|e| DecodeError::invalid_input(e.to_string()))?;
        let decoder = self.decoder.clone();

        tokio::task::spawn_blocking(move || {
            let frame = image::load_from_memory_with_format(&bytes, format)
                .map_err(|e| DecodeError::invalid_input(e.to_string()))?;
            decoder.decode(&frame).ok_or(DecodeError::NotFound)
        })
        .await
        .map_err(|e| DecodeError::invalid_input(format!("decoding aborted: {}", e)))?
    }
}

async fn decode_frame(decoder: Arc<dyn QrDecoder>, frame: Frame) -> FrameDecode {
    match tokio::task::spawn_blocking(move || decoder.decode(&frame)).await {
        Ok(Some(payload)) => FrameDecode::Decoded(payload),
        Ok(None) => FrameDecode::NoCode,
        Err(e) => {
            log::warn!("Frame decode aborted: {}", e);
            FrameDecode::NoCode
        }
    }
}

/// True when the path's extension maps to an `image/*` MIME type
pub fn is_image_path(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
}
