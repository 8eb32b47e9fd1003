//! Test doubles for the decoder adapter
//!
//! Shared with the scan session tests. Frames carry their identity in their
//! width: [`ScriptedDecoder`] maps a width to a payload, so any number of
//! distinct "QR codes" can be produced without real QR imagery.

use crate::decoder::error::{DecodeError, DecodeResult};
use crate::decoder::qr::QrDecoder;
use crate::decoder::source::{DeviceLease, FrameFeed, VideoSource};
use crate::decoder::types::{Frame, ScanPayload};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A blank frame identified by its width
pub fn frame(width: u32) -> Frame {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, 4, Luma([255])))
}

/// PNG bytes of [`frame`]
pub fn png_bytes(width: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    frame(width)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Decodes frames by width lookup and counts invocations
#[derive(Default)]
pub struct ScriptedDecoder {
    payloads: HashMap<u32, String>,
    calls: AtomicUsize,
}

impl ScriptedDecoder {
    pub fn new(payloads: &[(u32, &str)]) -> Self {
        Self {
            payloads: payloads
                .iter()
                .map(|(width, payload)| (*width, payload.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QrDecoder for ScriptedDecoder {
    fn decode(&self, frame: &Frame) -> Option<ScanPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.get(&frame.width()).map(ScanPayload::new)
    }
}

#[derive(Default)]
struct ChannelSourceState {
    sender: Option<mpsc::Sender<DecodeResult<Frame>>>,
    active: bool,
}

/// Video source fed by the test through [`ChannelSource::push`]
#[derive(Clone, Default)]
pub struct ChannelSource {
    state: Arc<Mutex<ChannelSourceState>>,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    fail_open: Arc<Mutex<Option<DecodeError>>>,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `open()` calls fail with `error`
    pub fn fail_open_with(&self, error: DecodeError) {
        *self.fail_open.lock().unwrap() = Some(error);
    }

    /// Deliver a frame to the current feed; false if no feed is open
    pub async fn push(&self, frame: Frame) -> bool {
        self.push_result(Ok(frame)).await
    }

    /// Report device loss to the current feed
    pub async fn lose_device(&self, message: &str) -> bool {
        self.push_result(Err(DecodeError::device(message))).await
    }

    async fn push_result(&self, item: DecodeResult<Frame>) -> bool {
        let sender = self.state.lock().unwrap().sender.clone();
        match sender {
            Some(sender) => sender.send(item).await.is_ok(),
            None => false,
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }
}

impl VideoSource for ChannelSource {
    fn open(&self) -> DecodeResult<FrameFeed> {
        if let Some(error) = self.fail_open.lock().unwrap().clone() {
            return Err(error);
        }

        let mut state = self.state.lock().unwrap();
        if state.active {
            return Err(DecodeError::device("already in use"));
        }
        let (tx, rx) = mpsc::channel(16);
        state.sender = Some(tx);
        state.active = true;
        self.opened.fetch_add(1, Ordering::SeqCst);

        let shared = self.state.clone();
        let released = self.released.clone();
        let lease = DeviceLease::new(move || {
            let mut state = shared.lock().unwrap();
            state.sender = None;
            state.active = false;
            released.fetch_add(1, Ordering::SeqCst);
        });

        Ok(FrameFeed { frames: rx, lease })
    }
}
