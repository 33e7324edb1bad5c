// SPDX-License-Identifier: Apache-2.0

//! Test collaborator that probes deployed functions over HTTP.
//!
//! Issues a configurable number of cold and warm requests against the
//! function URL and reports per-phase request counts and average durations.
//! No statistical analysis happens here; the harness only captures simple
//! durations. Request errors are reported inside the metrics map.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use gcfbench_core::{FunctionProber, RunConfig};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct HttpProber {
    client: reqwest::Client,
    cold_requests: u32,
    warm_requests: u32,
}

impl HttpProber {
    pub fn new(cold_requests: u32, warm_requests: u32) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            cold_requests,
            warm_requests,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.cold_requests, config.warm_requests)
    }

    /// Issue one GET and return its wall-clock duration in milliseconds.
    async fn timed_request(&self, url: &str) -> Result<f64, reqwest::Error> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        // Drain the body so the duration covers the full response.
        let _ = response.bytes().await?;
        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

impl FunctionProber for HttpProber {
    async fn probe(&self, url: &str) -> HashMap<String, Value> {
        let mut cold_samples = Vec::with_capacity(self.cold_requests as usize);
        let mut warm_samples = Vec::with_capacity(self.warm_requests as usize);
        let mut error = None;

        // The first requests hit a freshly deployed instance and count as
        // cold; the remainder measure the warm path.
        'outer: for (samples, count) in [
            (&mut cold_samples, self.cold_requests),
            (&mut warm_samples, self.warm_requests),
        ] {
            for _ in 0..count {
                match self.timed_request(url).await {
                    Ok(duration_ms) => samples.push(duration_ms),
                    Err(err) => {
                        error = Some(err.to_string());
                        break 'outer;
                    }
                }
            }
        }

        let mut metrics = HashMap::from([
            (
                "cold_start_requests".to_string(),
                json!(cold_samples.len()),
            ),
            (
                "warm_start_requests".to_string(),
                json!(warm_samples.len()),
            ),
            ("cold_start_samples_ms".to_string(), json!(cold_samples)),
            ("warm_start_samples_ms".to_string(), json!(warm_samples)),
        ]);
        if let Some(avg) = mean(&cold_samples) {
            metrics.insert("cold_start_avg_ms".to_string(), json!(avg));
        }
        if let Some(avg) = mean(&warm_samples) {
            metrics.insert("warm_start_avg_ms".to_string(), json!(avg));
        }
        if let Some(error) = error {
            metrics.insert("error".to_string(), json!(error));
        }
        metrics
    }
}

fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    /// Minimal one-shot HTTP server answering every connection with 200 OK.
    async fn spawn_stub_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
                        )
                        .await;
                });
            }
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn test_probe_collects_cold_and_warm_samples() {
        let url = spawn_stub_server().await;
        let prober = HttpProber::new(1, 3).unwrap();

        let metrics = prober.probe(&url).await;
        assert_eq!(metrics["cold_start_requests"], json!(1));
        assert_eq!(metrics["warm_start_requests"], json!(3));
        assert!(metrics.contains_key("cold_start_avg_ms"));
        assert!(metrics.contains_key("warm_start_avg_ms"));
        assert!(!metrics.contains_key("error"));
    }

    #[tokio::test]
    async fn test_probe_reports_unreachable_endpoint_as_data() {
        // Bind then drop a listener so the port is very likely unused.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new(1, 1).unwrap();
        let metrics = prober.probe(&format!("http://{addr}/")).await;

        assert!(metrics.contains_key("error"));
        assert_eq!(metrics["cold_start_requests"], json!(0));
    }
}
