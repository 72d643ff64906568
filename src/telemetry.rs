use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// One snapshot of GPU metrics, as the telemetry service reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GpuSample {
    #[serde(default)]
    pub utilization: f64,
    #[serde(default)]
    pub memory_used: f64,
    #[serde(default)]
    pub memory_total: f64,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub power_usage: f64,
    #[serde(default)]
    pub power_limit: f64,
    #[serde(default)]
    pub fan_speed: f64,
}

/// A sample stamped with its client-side arrival time.
#[derive(Debug, Clone)]
pub struct TelemetrySample {
    pub gpu: GpuSample,
    pub at: DateTime<Local>,
}

impl TelemetrySample {
    pub fn now(gpu: GpuSample) -> Self {
        Self { gpu, at: Local::now() }
    }
}

/// Feed transport: fixed-interval polling or a server-sent-event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    Poll,
    Sse,
}

/// Ordered sequence of the most recent samples. A bounded window drops the
/// oldest entry on overflow; an unbounded one keeps the whole session.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    cap: Option<usize>,
    items: VecDeque<T>,
}

impl<T> RollingWindow<T> {
    pub fn bounded(cap: usize) -> Self {
        Self {
            cap: Some(cap.max(1)),
            items: VecDeque::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self { cap: None, items: VecDeque::new() }
    }

    pub fn new(cap: Option<usize>) -> Self {
        match cap {
            Some(n) => Self::bounded(n),
            None => Self::unbounded(),
        }
    }

    pub fn push(&mut self, item: T) {
        if let Some(cap) = self.cap {
            while self.items.len() >= cap {
                self.items.pop_front();
            }
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Run the configured feed until the receiving side disconnects or the
/// stream ends. Samples are delivered over `tx`; a closed channel is the
/// cancellation signal, so teardown happens exactly once with the app.
pub async fn run_feed(
    client: reqwest::Client,
    mode: FeedMode,
    api_base: String,
    poll_interval: Duration,
    tx: async_channel::Sender<GpuSample>,
) -> Result<(), ClientError> {
    match mode {
        FeedMode::Poll => poll_loop(client, api_base, poll_interval, tx).await,
        FeedMode::Sse => sse_loop(client, api_base, tx).await,
    }
}

/// Fixed-interval GET of `/api/gpu-stats`, one sample per response.
/// Fetch and parse failures are logged and skipped; polling continues.
async fn poll_loop(
    client: reqwest::Client,
    api_base: String,
    interval: Duration,
    tx: async_channel::Sender<GpuSample>,
) -> Result<(), ClientError> {
    let url = format!("{}/api/gpu-stats", api_base.trim_end_matches('/'));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let sample = match fetch_sample(&client, &url).await {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("GPU stats fetch failed: {e}");
                continue;
            }
        };
        if tx.send(sample).await.is_err() {
            log::info!("Telemetry receiver gone, stopping poll");
            return Ok(());
        }
    }
}

async fn fetch_sample(
    client: &reqwest::Client,
    url: &str,
) -> Result<Option<GpuSample>, ClientError> {
    let value: serde_json::Value = client.get(url).send().await?.json().await?;
    if let Some(err) = value.get("error") {
        log::warn!("Telemetry service error: {err}");
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(sample) => Ok(Some(sample)),
        Err(e) => {
            log::warn!("Malformed GPU sample: {e}");
            Ok(None)
        }
    }
}

/// Envelope carried by each SSE event on `/api/gpu-usage`.
#[derive(Debug, Deserialize)]
struct GpuUsageFrame {
    #[serde(default)]
    gpu_usage: Vec<GpuSample>,
}

/// Decode one SSE line. Non-data lines (comments, blank keep-alives) yield
/// nothing; a malformed data payload is logged and dropped.
fn decode_sse_line(line: &str) -> Vec<GpuSample> {
    let Some(payload) = line.strip_prefix("data: ") else {
        return Vec::new();
    };
    match serde_json::from_str::<GpuUsageFrame>(payload) {
        Ok(frame) => frame.gpu_usage,
        Err(e) => {
            log::warn!("Malformed SSE payload: {e}");
            Vec::new()
        }
    }
}

/// Persistent streamed connection to `/api/gpu-usage`. Returns when the
/// server closes the stream or the receiver disconnects.
async fn sse_loop(
    client: reqwest::Client,
    api_base: String,
    tx: async_channel::Sender<GpuSample>,
) -> Result<(), ClientError> {
    use futures_util::StreamExt;

    let url = format!("{}/api/gpu-usage", api_base.trim_end_matches('/'));
    let resp = client.get(&url).send().await?;
    if !resp.status().is_success() {
        return Err(ClientError::BadStatus(resp.status()));
    }

    let mut stream = resp.bytes_stream();
    let mut buf = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buf.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(pos) = buf.find('\n') {
            let line: String = buf.drain(..=pos).collect();
            for sample in decode_sse_line(line.trim_end()) {
                if tx.send(sample).await.is_err() {
                    log::info!("Telemetry receiver gone, closing stream");
                    return Ok(());
                }
            }
        }
    }

    log::info!("Telemetry stream ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn bounded_window_keeps_the_most_recent_samples_in_order() {
        let mut window = RollingWindow::bounded(3);
        for i in 0..7u32 {
            window.push(i);
        }
        assert_eq!(window.len(), 3);
        assert!(!window.is_empty());
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(window.latest(), Some(&6));
    }

    #[test]
    fn unbounded_window_keeps_everything() {
        let mut window = RollingWindow::unbounded();
        for i in 0..100u32 {
            window.push(i);
        }
        assert_eq!(window.len(), 100);
    }

    #[test]
    fn data_lines_decode_every_sample_in_the_frame() {
        let line = r#"data: {"gpu_usage": [{"utilization": 42.0, "temperature": 61.0}, {"utilization": 7.5}]}"#;
        let samples = decode_sse_line(line);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].utilization, 42.0);
        assert_eq!(samples[0].temperature, 61.0);
        assert_eq!(samples[1].utilization, 7.5);
    }

    #[test]
    fn non_data_and_malformed_lines_are_dropped() {
        assert!(decode_sse_line(": keep-alive").is_empty());
        assert!(decode_sse_line("").is_empty());
        assert!(decode_sse_line("data: {not json").is_empty());
        assert!(decode_sse_line("event: gpu").is_empty());
    }

    #[tokio::test]
    async fn poll_feed_delivers_samples_and_stops_when_receiver_drops() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/gpu-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "utilization": 17.0,
                "memory_used": 2048.0,
                "memory_total": 24576.0,
                "temperature": 55.0,
                "power_usage": 120.0,
                "power_limit": 350.0,
                "fan_speed": 31.0
            })))
            .mount(&server)
            .await;

        let (tx, rx) = async_channel::unbounded();
        let handle = tokio::spawn(run_feed(
            reqwest::Client::new(),
            FeedMode::Poll,
            server.uri(),
            Duration::from_millis(10),
            tx,
        ));

        let sample = rx.recv().await.unwrap();
        assert_eq!(sample.utilization, 17.0);
        assert_eq!(sample.memory_total, 24576.0);

        drop(rx);
        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("feed must stop once the receiver is gone")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn poll_feed_skips_error_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/gpu-stats"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "nvml unavailable"})),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/api/gpu-stats", server.uri());
        assert!(fetch_sample(&client, &url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sse_feed_parses_data_frames_from_the_stream() {
        let body = concat!(
            "data: {\"gpu_usage\": [{\"utilization\": 3.0, \"fan_speed\": 40.0}]}\n\n",
            ": keep-alive\n",
            "data: {\"gpu_usage\": [{\"utilization\": 9.0}]}\n\n",
        );
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/gpu-usage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let (tx, rx) = async_channel::unbounded();
        run_feed(
            reqwest::Client::new(),
            FeedMode::Sse,
            server.uri(),
            Duration::from_millis(10),
            tx,
        )
        .await
        .unwrap();

        let mut got = Vec::new();
        while let Ok(sample) = rx.recv().await {
            got.push(sample.utilization);
        }
        assert_eq!(got, vec![3.0, 9.0]);
    }
}
