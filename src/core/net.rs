// src/core/net.rs

// Blocking HTTP GET with a fixed timeout and a status check.
// One attempt per call; callers decide what a failure means.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::consts::USER_AGENT;
use crate::error::FetchError;

/// Source of raw feed bytes. The runner only sees this trait, so tests
/// can hand it canned documents or failures.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        http_get(&self.client, url)
    }
}

pub fn http_get(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    logd!("GET {url}");
    let resp = client.get(url).send()?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status { status: status.as_u16(), url: s!(url) });
    }

    let body = resp.bytes()?;
    if body.is_empty() {
        return Err(FetchError::EmptyBody(s!(url)));
    }
    logd!("{} bytes from {url}", body.len());
    Ok(body.to_vec())
}
