//! Thumbnail existence probing
//!
//! Candidates are checked one at a time with a HEAD request; the first one
//! that answers with a success or redirect status wins. Redirects are not
//! followed, a 3xx answer already counts as a hit.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::ThumbnailConfig;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Whether the resource at `url` exists. Network errors count as "no".
    async fn exists(&self, url: &str) -> bool;
}

/// HEAD-request prober backed by a shared reqwest client
#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ThumbnailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    true
                } else {
                    debug!("Thumbnail probe {} returned {}", url, status);
                    false
                }
            }
            Err(e) => {
                debug!("Thumbnail probe {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Return the first candidate the prober confirms, in order
pub async fn first_available<P>(probe: &P, candidates: &[String]) -> Option<String>
where
    P: Probe + ?Sized,
{
    for candidate in candidates {
        if probe.exists(candidate).await {
            return Some(candidate.clone());
        }
    }
    None
}

/// Resolve a thumbnail for a video link by probing its candidates
pub async fn find_thumbnail<P>(probe: &P, video_url: &str) -> Option<String>
where
    P: Probe + ?Sized,
{
    let candidates = super::thumbnail_candidates(video_url);
    if candidates.is_empty() {
        return None;
    }
    first_available(probe, &candidates).await
}
