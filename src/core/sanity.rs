use crate::utils::error::Result;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

pub const DEFAULT_DOI_RESOLVER: &str = "https://doi.org";
pub const MAX_URL_LENGTH: usize = 2000;

const CSL_JSON: &str = "application/vnd.citationstyles.csl+json";

// Crossref 建議的 DOI 格式
// https://www.crossref.org/blog/dois-and-matching-regular-expressions/
static VALID_DOI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^10.\d{4,9}/[-._;()/:A-Z0-9]+$").expect("DOI pattern is a valid regex")
});

/// Whether `doi` has a valid DOI structure. No network access.
pub fn validate_doi(doi: &str) -> bool {
    VALID_DOI.is_match(doi)
}

/// Cheap shape check on a candidate full text URL.
pub fn sensible_url(url: &str) -> bool {
    url.chars().count() <= MAX_URL_LENGTH && url.starts_with("http") && url.contains("://")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Works,
    NotFound,
    /// 非 200/404 的狀態碼，或連線失敗
    Error(String),
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Works => write!(f, "working"),
            LinkStatus::NotFound => write!(f, "not found"),
            LinkStatus::Error(detail) => write!(f, "error ({})", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoiResolution {
    Resolves,
    DoesNotResolve,
    /// The resolver answered with metadata for a different DOI.
    Mismatch(String),
    InvalidStructure,
}

#[derive(Debug, Deserialize)]
struct CslMetadata {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

/// Network-backed link checks, sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct LinkChecker {
    client: Client,
    resolver: String,
}

impl LinkChecker {
    pub fn new(client: Client) -> Self {
        Self::with_resolver(client, DEFAULT_DOI_RESOLVER)
    }

    pub fn with_resolver(client: Client, resolver: impl Into<String>) -> Self {
        Self {
            client,
            resolver: resolver.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn check_if_link_works(&self, url: &str) -> LinkStatus {
        tracing::debug!("Checking link: {}", url);
        match self.client.get(url).send().await {
            Ok(response) => match response.status() {
                StatusCode::OK => LinkStatus::Works,
                StatusCode::NOT_FOUND => LinkStatus::NotFound,
                other => LinkStatus::Error(other.to_string()),
            },
            Err(e) => LinkStatus::Error(e.to_string()),
        }
    }

    /// 確認 DOI 可以透過 resolver 解析，且 metadata 指回同一個 DOI（大小寫不計）
    pub async fn check_if_doi_resolves(&self, doi: &str) -> Result<DoiResolution> {
        if !validate_doi(doi) {
            return Ok(DoiResolution::InvalidStructure);
        }

        let url = format!("{}/{}", self.resolver, doi);
        // 只有 404 算解析失敗；landing page 擋爬蟲 (403 等) 時仍去拿 CSL metadata
        let status = self.check_if_link_works(&url).await;
        if status == LinkStatus::NotFound {
            tracing::debug!("DOI {} did not resolve: {}", doi, status);
            return Ok(DoiResolution::DoesNotResolve);
        }

        let metadata: CslMetadata = self
            .client
            .get(&url)
            .header(ACCEPT, CSL_JSON)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(match metadata.doi {
            Some(found) if found.to_lowercase() == doi.to_lowercase() => DoiResolution::Resolves,
            Some(found) => DoiResolution::Mismatch(found),
            None => DoiResolution::DoesNotResolve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_validate_doi() {
        assert!(validate_doi("10.1371/journal.pone.0029744"));
        assert!(!validate_doi("10.1002/(SICI)1097-4636(199812)43:4<1::AID-JBM1>3.0.CO;2-#"));
        assert!(validate_doi("10.1016/S0140-6736(20)30183-5"));
        assert!(!validate_doi("not-a-doi"));
        assert!(!validate_doi("10.123/too-short-prefix"));
        assert!(!validate_doi("10.1371/"));
        assert!(!validate_doi(" 10.1371/journal.pone.0029744"));
    }

    #[test]
    fn test_sensible_url() {
        assert!(sensible_url("https://example.com/x"));
        assert!(sensible_url("http://example.com/paper.pdf"));
        assert!(!sensible_url("ftp:noslashes"));
        assert!(!sensible_url("ftp://example.com/x"));
        assert!(!sensible_url("https:example.com"));
        assert!(!sensible_url(""));
    }

    #[test]
    fn test_sensible_url_length_limit() {
        let prefix = "https://example.com/";
        let at_limit = format!("{}{}", prefix, "a".repeat(MAX_URL_LENGTH - prefix.len()));
        let over_limit = format!("{}a", at_limit);
        assert!(sensible_url(&at_limit));
        assert!(!sensible_url(&over_limit));
    }

    #[test]
    fn test_sensible_url_length_counts_characters() {
        let prefix = "https://example.com/";
        let at_limit = format!("{}{}", prefix, "é".repeat(MAX_URL_LENGTH - prefix.len()));
        assert!(at_limit.len() > MAX_URL_LENGTH);
        assert!(sensible_url(&at_limit));
        assert!(!sensible_url(&format!("{}é", at_limit)));
    }

    #[tokio::test]
    async fn test_check_if_link_works_statuses() {
        let server = MockServer::start();
        let ok = server.mock(|when, then| {
            when.method(GET).path("/ok");
            then.status(200).body("fine");
        });
        let missing = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        let broken = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });

        let checker = LinkChecker::new(Client::new());

        assert_eq!(checker.check_if_link_works(&server.url("/ok")).await, LinkStatus::Works);
        assert_eq!(
            checker.check_if_link_works(&server.url("/missing")).await,
            LinkStatus::NotFound
        );
        assert!(matches!(
            checker.check_if_link_works(&server.url("/broken")).await,
            LinkStatus::Error(_)
        ));

        ok.assert();
        missing.assert();
        broken.assert();
    }

    #[tokio::test]
    async fn test_check_if_doi_resolves_case_insensitive() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/10.1371/journal.pone.0029744");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"DOI": "10.1371/JOURNAL.PONE.0029744"}));
        });

        let checker = LinkChecker::with_resolver(Client::new(), server.base_url());
        let result = checker
            .check_if_doi_resolves("10.1371/journal.pone.0029744")
            .await
            .unwrap();

        assert_eq!(result, DoiResolution::Resolves);
    }

    #[tokio::test]
    async fn test_check_if_doi_resolves_mismatch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/10.1000/abc");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"DOI": "10.1000/other"}));
        });

        let checker = LinkChecker::with_resolver(Client::new(), server.base_url());
        let result = checker.check_if_doi_resolves("10.1000/abc").await.unwrap();

        assert_eq!(result, DoiResolution::Mismatch("10.1000/other".to_string()));
    }

    #[tokio::test]
    async fn test_check_if_doi_resolves_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/10.1000/gone");
            then.status(404);
        });

        let checker = LinkChecker::with_resolver(Client::new(), server.base_url());
        let result = checker.check_if_doi_resolves("10.1000/gone").await.unwrap();

        assert_eq!(result, DoiResolution::DoesNotResolve);
    }

    #[tokio::test]
    async fn test_check_if_doi_resolves_behind_forbidden_landing_page() {
        let server = MockServer::start();
        // 先註冊的 mock 先比對
        let csl = server.mock(|when, then| {
            when.method(GET)
                .path("/10.1000/abc")
                .header("accept", CSL_JSON);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"DOI": "10.1000/abc"}));
        });
        let landing = server.mock(|when, then| {
            when.method(GET).path("/10.1000/abc");
            then.status(403);
        });

        let checker = LinkChecker::with_resolver(Client::new(), server.base_url());
        let result = checker.check_if_doi_resolves("10.1000/abc").await.unwrap();

        assert_eq!(result, DoiResolution::Resolves);
        landing.assert();
        csl.assert();
    }

    #[tokio::test]
    async fn test_check_if_doi_resolves_invalid_structure_skips_network() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.method(GET);
            then.status(200);
        });

        let checker = LinkChecker::with_resolver(Client::new(), server.base_url());
        let result = checker.check_if_doi_resolves("not-a-doi").await.unwrap();

        assert_eq!(result, DoiResolution::InvalidStructure);
        any.assert_hits(0);
    }
}
