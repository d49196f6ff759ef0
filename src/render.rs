// Server-side chart render round trip.
//
// The POST runs on its own short-lived thread so the poll loop never
// waits on the render service; the only thing that crosses back is
// the shortened URL, over an mpsc channel the loop drains.  The
// worker owns no shared state.

use std::sync::mpsc::Sender;
use std::thread;

use anyhow::{anyhow, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::chart;
use crate::http_client;

const WORKER_STACK_BYTES: usize = 12 * 1024;

#[derive(Deserialize)]
struct CreateReply {
    url: Option<String>,
}

/// Fire-and-forget render request.  On success the shortened URL is
/// pushed into `links`; on any failure the forward is skipped, no
/// retry.
pub fn spawn_render_request(body: String, links: Sender<String>) {
    let spawned = thread::Builder::new()
        .name("chart-render".into())
        .stack_size(WORKER_STACK_BYTES)
        .spawn(move || match fetch_short_url(&body) {
            Ok(url) => {
                info!("chart render ready: {}", url);
                let _ = links.send(url);
            }
            Err(e) => warn!("chart render failed: {:#}", e),
        });
    if let Err(e) = spawned {
        warn!("failed to spawn chart-render thread: {}", e);
    }
}

fn fetch_short_url(body: &str) -> Result<String> {
    http_client::https_post_json(
        chart::CREATE_ENDPOINT,
        &[("Content-Type", "application/json")],
        body.as_bytes(),
        |text| {
            let reply: CreateReply = serde_json::from_str(text)?;
            reply
                .url
                .ok_or_else(|| anyhow!("render response has no url field"))
        },
    )
}
