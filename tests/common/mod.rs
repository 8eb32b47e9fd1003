//! Shared helpers for integration tests

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use rollcall::backend::{Acknowledgment, ApiError, ApiResult, AttendanceRecorder, StudentId};
use rollcall::decoder::{Frame, QrDecoder, ScanPayload};
use rollcall::session::api::{ScanSession, SessionEvent};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const PATIENCE: Duration = Duration::from_secs(10);

/// Frames are blank; the frame width selects the payload the decoder reports
pub struct WidthDecoder {
    payloads: HashMap<u32, String>,
}

impl WidthDecoder {
    pub fn new(payloads: &[(u32, &str)]) -> Arc<Self> {
        Arc::new(Self {
            payloads: payloads
                .iter()
                .map(|(width, payload)| (*width, payload.to_string()))
                .collect(),
        })
    }
}

impl QrDecoder for WidthDecoder {
    fn decode(&self, frame: &Frame) -> Option<ScanPayload> {
        self.payloads.get(&frame.width()).map(ScanPayload::new)
    }
}

pub fn blank_frame(width: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, 4, Luma([255])))
}

pub fn png_bytes(width: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    blank_frame(width)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Write a frame the way a capture tool does: to a temporary name, then rename
pub fn write_frame(dir: &Path, name: &str, width: u32) {
    let partial = dir.join(format!("{}.part", name));
    blank_frame(width)
        .save_with_format(&partial, ImageFormat::Png)
        .unwrap();
    std::fs::rename(&partial, dir.join(format!("{}.png", name))).unwrap();
}

/// Records every student it is asked about; fails for the listed ids
#[derive(Default)]
pub struct LedgerRecorder {
    recorded: Mutex<Vec<u64>>,
    failing: Vec<u64>,
}

impl LedgerRecorder {
    pub fn failing_for(ids: &[u64]) -> Arc<Self> {
        Arc::new(Self {
            recorded: Mutex::new(Vec::new()),
            failing: ids.to_vec(),
        })
    }

    pub fn recorded(&self) -> Vec<u64> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AttendanceRecorder for LedgerRecorder {
    async fn record_attendance(&self, student: StudentId) -> ApiResult<Acknowledgment> {
        self.recorded.lock().unwrap().push(student.get());
        if self.failing.contains(&student.get()) {
            return Err(ApiError::Rejected {
                status: 404,
                detail: Some(format!("Student {} not found", student)),
            });
        }
        Ok(Acknowledgment::default())
    }
}

/// Collect events until one matches `done`
pub async fn events_until(
    session: &mut ScanSession,
    done: impl Fn(&SessionEvent) -> bool,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    tokio::time::timeout(PATIENCE, async {
        while let Some(event) = session.next_event().await {
            let finished = done(&event);
            events.push(event);
            if finished {
                return;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out; events so far: {:?}", events));
    events
}

/// One HTTP request as seen by [`StubBackend`]
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub request_line: String,
    pub authorization: Option<String>,
}

/// Answers every connection with the same status and JSON body
pub struct StubBackend {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl StubBackend {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let head = read_head(&mut stream).await;
                let mut lines = head.lines();
                let request_line = lines.next().unwrap_or_default().to_string();
                let authorization = lines
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                    .map(|(_, value)| value.trim().to_string());
                log.lock().unwrap().push(SeenRequest {
                    request_line,
                    authorization,
                });

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, seen }
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

/// Reads the request head and any body announced by Content-Length
async fn read_head(stream: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
        if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&raw[..end]).to_string();
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while raw.len() < end + 4 + length {
                let n = stream.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
            return head;
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}
