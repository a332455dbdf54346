use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::errors::ReviveError;

/// Default per-probe timeout. Scans touch hundreds of URLs, so each check
/// has to stay cheap.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(8);

/// Some origins refuse anything that does not look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

const FETCH_ATTEMPTS: u32 = 3;
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(5);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Verdict of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ok,
    Failed,
}

impl ProbeOutcome {
    pub fn is_ok(self) -> bool {
        self == ProbeOutcome::Ok
    }
}

/// A liveness check over a stream URL. Abstracted so the reconciliation
/// driver can be exercised with a canned prober in tests.
pub trait Probe {
    fn probe(&self, url: &str) -> impl Future<Output = ProbeOutcome>;
}

/// Header-only HTTP liveness check: follow redirects, read the status and
/// Content-Type, never pull the body. A single attempt; retrying is the
/// caller's policy, not the probe's.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// The underlying HTTP client, for callers that also need to download
    /// whole playlists over the same connection pool.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            // Timeouts, DNS, refused connections, TLS: all just "dead".
            Err(_) => return ProbeOutcome::Failed,
        };
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Dropping resp here releases the connection with the body unread.
        classify(resp.status().as_u16(), content_type.as_deref())
    }
}

const TEXTUAL_TYPES: [&str; 3] = ["text/html", "text/plain", "application/json"];

/// Status/Content-Type classification shared by the prober and the
/// diagnosis tool. A textual payload is an error page even under a 200.
pub fn classify(status: u16, content_type: Option<&str>) -> ProbeOutcome {
    if !(200..400).contains(&status) {
        return ProbeOutcome::Failed;
    }
    match content_type {
        Some(ct) => {
            let ct = ct.to_lowercase();
            if TEXTUAL_TYPES.iter().any(|t| ct.contains(t)) {
                ProbeOutcome::Failed
            } else {
                ProbeOutcome::Ok
            }
        }
        None => ProbeOutcome::Ok,
    }
}

/// Rewrite Dropbox share links to the direct-download host; the share page
/// itself is HTML and would never parse as a playlist.
pub fn direct_download_url(url: &str) -> String {
    if url.contains("dropbox.com") {
        url.replace("www.dropbox.com", "dl.dropboxusercontent.com")
            .replace("?dl=0", "")
            .replace("?dl=1", "")
    } else {
        url.to_string()
    }
}

enum FetchFailure {
    Status(u16),
    Transport(String),
}

async fn try_fetch(client: &Client, url: &str) -> Result<String, FetchFailure> {
    let resp = client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| FetchFailure::Transport(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }
    resp.text()
        .await
        .map_err(|e| FetchFailure::Transport(e.to_string()))
}

/// Download a playlist: up to three attempts with a fixed delay. Transport
/// errors are retried; an HTTP error status means the server is up and
/// answering "no", so it fails the fetch immediately.
pub async fn fetch_playlist(client: &Client, url: &str) -> Result<String, ReviveError> {
    let url = direct_download_url(url);
    let mut last_error = String::new();
    for attempt in 1..=FETCH_ATTEMPTS {
        match try_fetch(client, &url).await {
            Ok(text) => return Ok(text),
            Err(FetchFailure::Status(code)) => return Err(ReviveError::FetchStatus(code)),
            Err(FetchFailure::Transport(e)) => {
                last_error = e;
                if attempt < FETCH_ATTEMPTS {
                    tokio::time::sleep(FETCH_RETRY_DELAY).await;
                }
            }
        }
    }
    Err(ReviveError::FetchExhausted {
        attempts: FETCH_ATTEMPTS,
        last_error,
    })
}
