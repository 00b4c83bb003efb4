//! URL account source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use stratus_core::{AccountFormat, AccountFormatParser, AccountRecord, Result, StratusError, ValueResolver};
use tracing::debug;

use crate::source::AccountSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads accounts from a single resource addressed by URL.
///
/// `file://` URLs are read from disk, `http` and `https` URLs with a GET.
/// The payload is parsed with the configured format on every call. Unlike the
/// directory source, a failure surfaces to the caller.
pub struct UrlSource<T> {
    url: Url,
    parser: AccountFormatParser<T>,
    client: Client,
}

impl<T: AccountRecord> UrlSource<T> {
    /// Creates a source for `url`. Fails on a malformed URL.
    pub fn new(url: &str, format: AccountFormat, resolver: ValueResolver) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| StratusError::configuration("url.url", format!("invalid URL '{}': {}", url, e)))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StratusError::configuration("url.url", format!("unable to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            parser: AccountFormatParser::new(format, resolver),
            client,
        })
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        match self.url.scheme() {
            "file" => {
                let path = self
                    .url
                    .to_file_path()
                    .map_err(|()| StratusError::fetch_error(self.url.as_str(), "not a local file path"))?;

                tokio::fs::read(&path)
                    .await
                    .map_err(|e| StratusError::fetch_error_with_cause(self.url.as_str(), "read failed", e))
            },
            "http" | "https" => {
                let response = self
                    .client
                    .get(self.url.clone())
                    .send()
                    .await
                    .map_err(|e| StratusError::fetch_error_with_cause(self.url.as_str(), "request failed", e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(StratusError::fetch_error(
                        self.url.as_str(),
                        format!("unexpected status {}", status),
                    ));
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| StratusError::fetch_error_with_cause(self.url.as_str(), "reading body failed", e))?;
                Ok(body.to_vec())
            },
            other => Err(StratusError::fetch_error(
                self.url.as_str(),
                format!("unsupported scheme '{}'", other),
            )),
        }
    }
}

#[async_trait]
impl<T: AccountRecord> AccountSource<T> for UrlSource<T> {
    fn name(&self) -> &str {
        self.url.as_str()
    }

    async fn list(&self) -> Result<Vec<T>> {
        let bytes = self.fetch().await?;
        let accounts = self.parser.parse(&bytes, self.url.as_str())?;
        debug!("Read {} {} accounts from {}", accounts.len(), T::PROVIDER, self.url);
        Ok(accounts)
    }
}
