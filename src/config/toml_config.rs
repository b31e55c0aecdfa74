use crate::adapters::fatcat::DEFAULT_FATCAT_ENDPOINT;
use crate::adapters::wikidata::DEFAULT_WIKIDATA_ENDPOINT;
use crate::core::sanity::DEFAULT_DOI_RESOLVER;
use crate::utils::error::{BotError, Result};
use crate::utils::validation::{
    validate_endpoint, validate_non_empty_string, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub open_access: OpenAccessConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub checks: ChecksConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAccessConfig {
    pub endpoint: String,
}

impl Default for OpenAccessConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FATCAT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub endpoint: String,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_WIKIDATA_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// 超過這個數量的 full text URL 就不再新增
    pub max_fulltext_statements: usize,
    pub verify_links: bool,
    pub verify_doi_resolution: bool,
    pub doi_resolver: String,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            max_fulltext_statements: 3,
            verify_links: false,
            verify_doi_resolution: false,
            doi_resolver: DEFAULT_DOI_RESOLVER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("oabot/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
        }
    }
}

impl BotConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BotError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OABOT_CONTACT})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Shared HTTP client for every adapter.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(self.http.user_agent.as_str())
            .timeout(self.timeout())
            .build()?;
        Ok(client)
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        validate_endpoint("open_access.endpoint", &self.open_access.endpoint)?;
        validate_endpoint("knowledge_base.endpoint", &self.knowledge_base.endpoint)?;
        if self.checks.verify_doi_resolution {
            validate_endpoint("checks.doi_resolver", &self.checks.doi_resolver)?;
        }
        validate_non_empty_string("http.user_agent", &self.http.user_agent)?;
        validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 600)?;
        Ok(())
    }
}
