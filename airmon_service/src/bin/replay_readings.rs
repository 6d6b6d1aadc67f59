#!/usr/bin/env rust
//! Replays recorded sensor readings into a running air quality service.
//!
//! Reads a JSON array of ingest payloads, e.g.
//!
//! ```json
//! [
//!   {"pm25": 12.0, "pm10": 40.0, "co2": 610, "temperature": 24.1, "humidity": 48},
//!   {"pm25": 88.5, "pm10": 160.0}
//! ]
//! ```
//!
//! and POSTs each one to `/api/air/ingest`. Payloads that fail local
//! validation are skipped without being sent.
//!
//! Usage:
//!   cargo run --bin replay_readings -- readings.json
//!   cargo run --bin replay_readings -- readings.json --url http://localhost:9000

use airmon_service::ingest::{IngestReading, IngestResponse};
use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;

const DEFAULT_URL: &str = "http://localhost:8000";

#[derive(Default)]
struct ReplaySummary {
    accepted: usize,
    skipped: usize,
    rejected: usize,
    by_category: BTreeMap<String, usize>,
}

fn parse_args() -> Result<(String, String), String> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("replay_readings");
    let usage = format!("Usage: {} <readings.json> [--url BASE_URL]", program);

    let mut path = None;
    let mut url = DEFAULT_URL.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                url = args.get(i + 1).cloned().ok_or_else(|| usage.clone())?;
                i += 2;
            }
            other if path.is_none() && !other.starts_with("--") => {
                path = Some(other.to_string());
                i += 1;
            }
            other => return Err(format!("Unknown argument: {}\n{}", other, usage)),
        }
    }

    let path = path.ok_or(usage)?;
    Ok((path, url.trim_end_matches('/').to_string()))
}

fn replay(path: &str, base_url: &str) -> Result<ReplaySummary, Box<dyn Error>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let payloads: Vec<IngestReading> = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path, e))?;

    println!("📥 Replaying {} readings to {}", payloads.len(), base_url);

    let client = reqwest::blocking::Client::new();
    let ingest_url = format!("{}/api/air/ingest", base_url);
    let mut summary = ReplaySummary::default();

    for (n, payload) in payloads.iter().enumerate() {
        if let Err(e) = payload.validate() {
            eprintln!("   ⚠ #{} skipped: {}", n, e);
            summary.skipped += 1;
            continue;
        }

        let response = client.post(&ingest_url).json(payload).send()?;
        let status = response.status();

        if status.is_success() {
            let body: IngestResponse = response.json()?;
            tracing::debug!("#{} -> AQI {} ({})", n, body.aqi, body.category);
            *summary.by_category.entry(body.category.to_string()).or_insert(0) += 1;
            summary.accepted += 1;
        } else {
            let text = response.text().unwrap_or_default();
            eprintln!("   ✗ #{} rejected ({}): {}", n, status, text.trim());
            summary.rejected += 1;
        }
    }

    Ok(summary)
}

fn main() {
    tracing_subscriber::fmt::init();

    let (path, url) = match parse_args() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    match replay(&path, &url) {
        Ok(summary) => {
            println!(
                "✓ Replay complete: {} accepted, {} rejected, {} skipped",
                summary.accepted, summary.rejected, summary.skipped
            );
            for (category, count) in &summary.by_category {
                println!("   {:<13} {}", category, count);
            }
            if summary.rejected > 0 {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Replay failed: {}", e);
            std::process::exit(1);
        }
    }
}
