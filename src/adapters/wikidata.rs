use crate::domain::model::{KnowledgeBaseItem, Proposal, Statement, FULL_TEXT_URL_PROPERTY};
use crate::domain::ports::{KnowledgeBaseReader, KnowledgeBaseWriter};
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

// item / property / lexeme
static ENTITY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[QPL]\d+$").expect("entity id pattern is a valid regex"));

pub const DEFAULT_WIKIDATA_ENDPOINT: &str = "https://www.wikidata.org";

#[derive(Debug, Deserialize)]
struct EntityDataResponse {
    #[serde(default)]
    entities: HashMap<String, RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    id: Option<String>,
    #[serde(default, deserialize_with = "claims_map")]
    claims: HashMap<String, Vec<RawStatement>>,
    missing: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawStatement {
    mainsnak: Option<RawSnak>,
}

#[derive(Debug, Deserialize)]
struct RawSnak {
    datavalue: Option<RawDataValue>,
}

#[derive(Debug, Deserialize)]
struct RawDataValue {
    value: serde_json::Value,
}

// 沒有任何 claim 時 Wikidata 會回傳 `[]` 而不是 `{}`
fn claims_map<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, Vec<RawStatement>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Object(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        _ => Ok(HashMap::new()),
    }
}

impl RawEntity {
    fn into_item(self, requested_id: &str) -> KnowledgeBaseItem {
        let claims = self
            .claims
            .into_iter()
            .map(|(property, statements)| {
                let statements = statements
                    .into_iter()
                    .map(|s| Statement {
                        value: s
                            .mainsnak
                            .and_then(|snak| snak.datavalue)
                            .and_then(|dv| dv.value.as_str().map(ToOwned::to_owned)),
                    })
                    .collect();
                (property, statements)
            })
            .collect();

        KnowledgeBaseItem {
            id: self.id.unwrap_or_else(|| requested_id.to_string()),
            claims,
        }
    }
}

/// Reads entity snapshots from `Special:EntityData`.
pub struct WikidataClient {
    client: Client,
    base_url: String,
}

impl WikidataClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn entity_url(&self, id: &str) -> String {
        format!("{}/wiki/Special:EntityData/{}.json", self.base_url, id)
    }
}

#[async_trait]
impl KnowledgeBaseReader for WikidataClient {
    async fn fetch_item(&self, id: &str) -> Result<Option<KnowledgeBaseItem>> {
        if !ENTITY_ID.is_match(id) {
            return Err(BotError::LookupError {
                message: format!("'{}' is not a usable item id", id),
            });
        }

        let url = self.entity_url(id);
        tracing::debug!("Fetching Wikidata entity: {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let mut data: EntityDataResponse = response.error_for_status()?.json().await?;

        // 重新導向的 item 會以目標 id 為 key
        let entity = match data.entities.remove(id) {
            Some(entity) => Some(entity),
            None => data.entities.into_values().next(),
        };

        Ok(entity
            .filter(|e| e.missing.is_none())
            .map(|e| e.into_item(id)))
    }
}

/// Records intended `P953` additions without editing Wikidata.
#[derive(Debug, Default)]
pub struct DryRunWriter {
    pending: Mutex<Vec<Proposal>>,
}

impl DryRunWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<Proposal> {
        self.pending
            .lock()
            .map(|pending| pending.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KnowledgeBaseWriter for DryRunWriter {
    async fn add_full_text_url(&self, proposal: &Proposal) -> Result<()> {
        tracing::info!(
            "📝 Dry run: would add {} {} to {}",
            FULL_TEXT_URL_PROPERTY,
            proposal.url,
            proposal.knowledge_base_id
        );
        let mut pending = self.pending.lock().map_err(|_| BotError::LookupError {
            message: "dry run writer lock poisoned".to_string(),
        })?;
        pending.push(proposal.clone());
        Ok(())
    }
}
