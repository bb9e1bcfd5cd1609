//! Liveness probes for external image providers.
//!
//! This is the only place thumbnail synthesis touches the network. Probes are
//! soft-fail: a timeout, transport error, or non-2xx status means "not alive"
//! and is never retried.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use clipscout_shared::{ClipScoutError, Result};

/// Answers whether an image URL is currently reachable.
pub trait ImageProbe {
    fn is_alive(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// HEAD-request probe with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ClipScout/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ClipScoutError::Network(format!("failed to build probe client: {e}")))?;
        Ok(Self { client })
    }
}

impl ImageProbe for HttpProbe {
    async fn is_alive(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                debug!(url, status = resp.status().as_u16(), ok, "image probe");
                ok
            }
            Err(e) => {
                debug!(url, error = %e, "image probe failed");
                false
            }
        }
    }
}

/// Probe for offline runs: nothing is ever reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProbe;

impl ImageProbe for OfflineProbe {
    async fn is_alive(&self, _url: &str) -> bool {
        false
    }
}
