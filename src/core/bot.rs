use crate::config::toml_config::ChecksConfig;
use crate::core::sanity::{sensible_url, validate_doi, DoiResolution, LinkChecker, LinkStatus};
use crate::domain::model::{
    Decision, InputRecord, Proposal, RunReport, SkipReason, FULL_TEXT_URL_PROPERTY,
};
use crate::domain::ports::{KnowledgeBaseReader, KnowledgeBaseWriter, OpenAccessLookup, RecordSource};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub max_fulltext_statements: usize,
    pub verify_links: bool,
    pub verify_doi_resolution: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            max_fulltext_statements: 3,
            verify_links: false,
            verify_doi_resolution: false,
        }
    }
}

impl From<&ChecksConfig> for BotSettings {
    fn from(checks: &ChecksConfig) -> Self {
        Self {
            max_fulltext_statements: checks.max_fulltext_statements,
            verify_links: checks.verify_links,
            verify_doi_resolution: checks.verify_doi_resolution,
        }
    }
}

/// Walks the input records one by one and decides, for each, whether a
/// full text URL should be added to the Wikidata item.
pub struct OaBot<R, O, K, W>
where
    R: RecordSource,
    O: OpenAccessLookup,
    K: KnowledgeBaseReader,
    W: KnowledgeBaseWriter,
{
    source: R,
    open_access: O,
    reader: K,
    writer: W,
    checker: LinkChecker,
    settings: BotSettings,
}

impl<R, O, K, W> OaBot<R, O, K, W>
where
    R: RecordSource,
    O: OpenAccessLookup,
    K: KnowledgeBaseReader,
    W: KnowledgeBaseWriter,
{
    pub fn new(
        source: R,
        open_access: O,
        reader: K,
        writer: W,
        checker: LinkChecker,
        settings: BotSettings,
    ) -> Self {
        Self {
            source,
            open_access,
            reader,
            writer,
            checker,
            settings,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub async fn run_bot(&self) -> Result<RunReport> {
        let records = self.source.load_records().await?;
        let mut report = RunReport::start();

        tracing::info!("🚀 Processing {} records", records.len());

        for record in &records {
            self.process_record(record, &mut report).await;
        }

        report.finish();
        tracing::info!(
            "✅ Done: {} processed, {} additions, {} skipped",
            report.processed,
            report.additions,
            report.skipped.len()
        );

        Ok(report)
    }

    /// 單筆處理，錯誤只記錄不往上丟
    pub async fn process_record(&self, record: &InputRecord, report: &mut RunReport) {
        match self.decide(record).await {
            Decision::Propose(proposal) => {
                tracing::info!(
                    "➕ Adding open access URL {} for {} to {}.",
                    proposal.url,
                    proposal.doi,
                    proposal.knowledge_base_id
                );
                match self.writer.add_full_text_url(&proposal).await {
                    Ok(()) => report.record_addition(proposal),
                    Err(e) => {
                        let reason = SkipReason::WriteFailed {
                            message: e.to_string(),
                        };
                        tracing::error!("❌ {}: {}", record.knowledge_base_id, reason);
                        report.record_skip(record, reason);
                    }
                }
            }
            Decision::Skip(reason) => {
                if reason.is_error() {
                    tracing::warn!("❌ Skipped {}: {}", record.knowledge_base_id, reason);
                } else {
                    tracing::info!("⏭️ Skipped {}: {}", record.knowledge_base_id, reason);
                }
                report.record_skip(record, reason);
            }
        }
    }

    pub async fn decide(&self, record: &InputRecord) -> Decision {
        let qid = &record.knowledge_base_id;
        let doi = &record.doi;

        let open_access = match self.open_access.find_open_access(doi).await {
            Ok(Some(result)) => result,
            Ok(None) => return Decision::Skip(SkipReason::NoOpenAccessUrl),
            Err(e) => {
                return Decision::Skip(SkipReason::LookupFailed {
                    message: e.to_string(),
                })
            }
        };

        if !validate_doi(doi) {
            return Decision::Skip(SkipReason::InvalidDoi);
        }
        if !sensible_url(&open_access.url) {
            return Decision::Skip(SkipReason::NotSensibleUrl {
                url: open_access.url,
            });
        }

        let item = match self.reader.fetch_item(qid).await {
            Ok(Some(item)) => item,
            Ok(None) => return Decision::Skip(SkipReason::ItemNotFound),
            Err(e) => {
                return Decision::Skip(SkipReason::LookupFailed {
                    message: e.to_string(),
                })
            }
        };

        let Some(item_doi) = item.doi() else {
            return Decision::Skip(SkipReason::MissingDoiClaim);
        };
        if item_doi.to_lowercase() != doi.to_lowercase() {
            return Decision::Skip(SkipReason::DoiMismatch {
                expected: doi.clone(),
                found: item_doi.to_string(),
            });
        }

        // 沒有 P953 的 item 目前只記錄，不新增
        let Some(statements) = item.statements(FULL_TEXT_URL_PROPERTY) else {
            tracing::info!("{} has no {}, adding.", qid, FULL_TEXT_URL_PROPERTY);
            return Decision::Skip(SkipReason::NoFullTextProperty);
        };
        let existing = statements.len();
        if existing > self.settings.max_fulltext_statements {
            return Decision::Skip(SkipReason::TooManyFullTextUrls { count: existing });
        }
        if item.full_text_urls().any(|url| url == open_access.url) {
            return Decision::Skip(SkipReason::UrlAlreadyPresent {
                url: open_access.url,
            });
        }

        if self.settings.verify_links {
            let status = self.checker.check_if_link_works(&open_access.url).await;
            if status != LinkStatus::Works {
                return Decision::Skip(SkipReason::LinkBroken {
                    url: open_access.url,
                    status: status.to_string(),
                });
            }
        }

        if self.settings.verify_doi_resolution {
            let detail = match self.checker.check_if_doi_resolves(doi).await {
                Ok(DoiResolution::Resolves) => None,
                Ok(DoiResolution::DoesNotResolve) => Some("no working resolver link".to_string()),
                Ok(DoiResolution::Mismatch(found)) => Some(format!("resolves to {}", found)),
                Ok(DoiResolution::InvalidStructure) => Some("invalid structure".to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(detail) = detail {
                return Decision::Skip(SkipReason::DoiUnresolved { detail });
            }
        }

        Decision::Propose(Proposal {
            knowledge_base_id: qid.clone(),
            doi: doi.clone(),
            url: open_access.url,
            existing_fulltext: existing,
        })
    }
}
