use crate::domain::model::OpenAccessResult;
use crate::domain::ports::OpenAccessLookup;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_FATCAT_ENDPOINT: &str = "https://api.fatcat.wiki/v0";

#[derive(Debug, Deserialize)]
struct FatcatRelease {
    #[serde(default)]
    files: Vec<FatcatFile>,
}

#[derive(Debug, Deserialize)]
struct FatcatFile {
    #[serde(default)]
    urls: Vec<FatcatUrl>,
}

#[derive(Debug, Deserialize)]
struct FatcatUrl {
    url: String,
    rel: Option<String>,
}

impl FatcatRelease {
    /// 優先使用非 web archive 的連結
    fn best_url(&self) -> Option<&str> {
        let mut urls = self
            .files
            .iter()
            .flat_map(|file| file.urls.iter())
            .filter(|u| !u.url.trim().is_empty());

        let first = urls.next()?;
        if first.rel.as_deref() != Some("webarchive") {
            return Some(first.url.as_str());
        }

        urls.find(|u| u.rel.as_deref() != Some("webarchive"))
            .map(|u| u.url.as_str())
            .or(Some(first.url.as_str()))
    }
}

/// Open access lookup backed by the fatcat release API.
pub struct FatcatClient {
    client: Client,
    base_url: String,
}

impl FatcatClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn lookup_url(&self, doi: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/release/lookup", self.base_url)).map_err(|e| {
            BotError::InvalidConfigValueError {
                field: "open_access.endpoint".to_string(),
                value: self.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        // fatcat 只存小寫 DOI
        url.query_pairs_mut()
            .append_pair("doi", &doi.to_lowercase())
            .append_pair("expand", "files");
        Ok(url)
    }
}

#[async_trait]
impl OpenAccessLookup for FatcatClient {
    async fn find_open_access(&self, doi: &str) -> Result<Option<OpenAccessResult>> {
        let url = self.lookup_url(doi)?;
        tracing::debug!("Looking up open access copy: {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("fatcat has no release for {}", doi);
            return Ok(None);
        }

        let release: FatcatRelease = response.error_for_status()?.json().await?;
        Ok(release.best_url().map(|url| OpenAccessResult {
            url: url.to_string(),
            source: Some("fatcat".to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_lookup_prefers_live_url_over_webarchive() {
        let server = MockServer::start();
        let lookup = server.mock(|when, then| {
            when.method(GET)
                .path("/release/lookup")
                .query_param("doi", "10.1371/journal.pone.0029744")
                .query_param("expand", "files");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "ident": "abc",
                    "files": [
                        {"urls": [
                            {"url": "https://web.archive.org/web/2020/x.pdf", "rel": "webarchive"},
                            {"url": "https://journals.plos.org/x.pdf", "rel": "publisher"}
                        ]}
                    ]
                }));
        });

        let client = FatcatClient::new(Client::new(), server.base_url());
        let result = client
            .find_open_access("10.1371/JOURNAL.PONE.0029744")
            .await
            .unwrap()
            .unwrap();

        lookup.assert();
        assert_eq!(result.url, "https://journals.plos.org/x.pdf");
        assert_eq!(result.source.as_deref(), Some("fatcat"));
    }

    #[tokio::test]
    async fn test_lookup_falls_back_to_webarchive() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/release/lookup");
            then.status(200).json_body(serde_json::json!({
                "files": [{"urls": [{"url": "https://web.archive.org/web/2020/x.pdf", "rel": "webarchive"}]}]
            }));
        });

        let client = FatcatClient::new(Client::new(), server.base_url());
        let result = client.find_open_access("10.1000/x").await.unwrap().unwrap();

        assert_eq!(result.url, "https://web.archive.org/web/2020/x.pdf");
    }

    #[tokio::test]
    async fn test_lookup_without_files_returns_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/release/lookup");
            then.status(200).json_body(serde_json::json!({"ident": "abc"}));
        });

        let client = FatcatClient::new(Client::new(), server.base_url());
        assert!(client.find_open_access("10.1000/x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_not_found_returns_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/release/lookup");
            then.status(404);
        });

        let client = FatcatClient::new(Client::new(), server.base_url());
        assert!(client.find_open_access("10.1000/x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_server_error_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/release/lookup");
            then.status(500);
        });

        let client = FatcatClient::new(Client::new(), server.base_url());
        let result = client.find_open_access("10.1000/x").await;
        assert!(matches!(result, Err(BotError::HttpError(_))));
    }
}
