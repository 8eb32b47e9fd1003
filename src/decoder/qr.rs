//! QR decode routine

use crate::decoder::types::{Frame, ScanPayload};

/// Finds and decodes a QR code in a frame
///
/// Implementations are synchronous and may be CPU heavy; callers run them on
/// the blocking pool.
pub trait QrDecoder: Send + Sync + 'static {
    fn decode(&self, frame: &Frame) -> Option<ScanPayload>;
}

/// Decoder backed by `rqrr`
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, frame: &Frame) -> Option<ScanPayload> {
        let luma = frame.to_luma8();
        let (width, height) = luma.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                luma.get_pixel(x as u32, y as u32).0[0]
            });

        // First grid that decodes wins
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => return Some(ScanPayload::new(content)),
                Err(e) => log::trace!("QR grid found but not decodable: {:?}", e),
            }
        }
        None
    }
}
