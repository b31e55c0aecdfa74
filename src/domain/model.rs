use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Wikidata property: DOI
pub const DOI_PROPERTY: &str = "P356";
/// Wikidata property: full work available at URL
pub const FULL_TEXT_URL_PROPERTY: &str = "P953";

/// 輸入檔的一列：知識庫 item ID 與其 DOI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(alias = "qid")]
    pub knowledge_base_id: String,
    pub doi: String,
}

impl InputRecord {
    pub fn new(knowledge_base_id: impl Into<String>, doi: impl Into<String>) -> Self {
        Self {
            knowledge_base_id: knowledge_base_id.into(),
            doi: doi.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccessResult {
    pub url: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// `mainsnak.datavalue.value`，只有字串型別時才有值
    pub value: Option<String>,
}

impl Statement {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

/// 唯讀快照，不會寫回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseItem {
    pub id: String,
    pub claims: HashMap<String, Vec<Statement>>,
}

impl KnowledgeBaseItem {
    pub fn statements(&self, property: &str) -> Option<&[Statement]> {
        self.claims.get(property).map(Vec::as_slice)
    }

    /// First recorded DOI, if any.
    pub fn doi(&self) -> Option<&str> {
        self.statements(DOI_PROPERTY)?
            .first()
            .and_then(|s| s.value.as_deref())
    }

    pub fn full_text_urls(&self) -> impl Iterator<Item = &str> {
        self.statements(FULL_TEXT_URL_PROPERTY)
            .unwrap_or_default()
            .iter()
            .filter_map(|s| s.value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub knowledge_base_id: String,
    pub doi: String,
    pub url: String,
    pub existing_fulltext: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoOpenAccessUrl,
    LookupFailed { message: String },
    InvalidDoi,
    NotSensibleUrl { url: String },
    ItemNotFound,
    MissingDoiClaim,
    DoiMismatch { expected: String, found: String },
    NoFullTextProperty,
    TooManyFullTextUrls { count: usize },
    UrlAlreadyPresent { url: String },
    LinkBroken { url: String, status: String },
    DoiUnresolved { detail: String },
    WriteFailed { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoOpenAccessUrl => write!(f, "no open access URL found"),
            SkipReason::LookupFailed { message } => write!(f, "lookup failed: {}", message),
            SkipReason::InvalidDoi => write!(f, "DOI is not a valid DOI structure"),
            SkipReason::NotSensibleUrl { url } => write!(f, "URL does not look sensible: {}", url),
            SkipReason::ItemNotFound => write!(f, "no Wikidata item found"),
            SkipReason::MissingDoiClaim => write!(f, "item has no {} statement", DOI_PROPERTY),
            SkipReason::DoiMismatch { expected, found } => write!(
                f,
                "mismatch between fatcat DOI {} and Wikidata DOI {}",
                expected, found
            ),
            SkipReason::NoFullTextProperty => {
                write!(f, "item has no {} statement yet", FULL_TEXT_URL_PROPERTY)
            }
            SkipReason::TooManyFullTextUrls { count } => {
                write!(f, "already has {} full text URLs", count)
            }
            SkipReason::UrlAlreadyPresent { url } => write!(f, "URL already listed: {}", url),
            SkipReason::LinkBroken { url, status } => write!(f, "link {} is {}", url, status),
            SkipReason::DoiUnresolved { detail } => write!(f, "DOI does not resolve: {}", detail),
            SkipReason::WriteFailed { message } => write!(f, "could not record addition: {}", message),
        }
    }
}

impl SkipReason {
    /// 對應原本 "Error:" 等級的訊息
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SkipReason::LookupFailed { .. }
                | SkipReason::ItemNotFound
                | SkipReason::DoiMismatch { .. }
                | SkipReason::WriteFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Propose(Proposal),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub knowledge_base_id: String,
    pub doi: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub processed: usize,
    pub additions: usize,
    pub proposals: Vec<Proposal>,
    pub skipped: Vec<SkippedRecord>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            processed: 0,
            additions: 0,
            proposals: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, record: &InputRecord, reason: SkipReason) {
        self.processed += 1;
        self.skipped.push(SkippedRecord {
            knowledge_base_id: record.knowledge_base_id.clone(),
            doi: record.doi.clone(),
            reason,
        });
    }

    pub fn record_addition(&mut self, proposal: Proposal) {
        self.processed += 1;
        self.additions += 1;
        self.proposals.push(proposal);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
