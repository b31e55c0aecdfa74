use crate::domain::model::RunReport;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::io::Write;

/// 人看的摘要，寫到 stdout
pub fn write_summary<Out: Write>(report: &RunReport, out: &mut Out) -> std::io::Result<()> {
    for proposal in &report.proposals {
        writeln!(
            out,
            "Adding open access URL {} for {} to {}.",
            proposal.url, proposal.doi, proposal.knowledge_base_id
        )?;
    }
    for skipped in &report.skipped {
        let level = if skipped.reason.is_error() { "Error" } else { "Info" };
        writeln!(
            out,
            "{}: skipped {} ({}): {}",
            level, skipped.knowledge_base_id, skipped.doi, skipped.reason
        )?;
    }
    writeln!(
        out,
        "Processed {} records: {} additions, {} skipped",
        report.processed,
        report.additions,
        report.skipped.len()
    )
}

pub fn print_summary(report: &RunReport) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_summary(report, &mut handle)
}

pub async fn save_report<S: Storage>(storage: &S, path: &str, report: &RunReport) -> Result<()> {
    let json_data = serde_json::to_string_pretty(report)?;
    tracing::debug!("Writing run report ({} bytes) to {}", json_data.len(), path);
    storage.write_file(path, json_data.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::{InputRecord, Proposal, SkipReason};
    use tempfile::TempDir;

    fn sample_report() -> RunReport {
        let mut report = RunReport::start();
        report.record_addition(Proposal {
            knowledge_base_id: "Q4115189".to_string(),
            doi: "10.1371/journal.pone.0029744".to_string(),
            url: "https://example.org/x.pdf".to_string(),
            existing_fulltext: 0,
        });
        report.record_skip(&InputRecord::new("Q42", "10.1000/x"), SkipReason::ItemNotFound);
        report.finish();
        report
    }

    #[test]
    fn test_write_summary() {
        let mut out = Vec::new();
        write_summary(&sample_report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Adding open access URL https://example.org/x.pdf for 10.1371/journal.pone.0029744 to Q4115189."
        );
        assert_eq!(lines[1], "Error: skipped Q42 (10.1000/x): no Wikidata item found");
        assert_eq!(lines[2], "Processed 2 records: 1 additions, 1 skipped");
    }

    #[tokio::test]
    async fn test_save_report_as_json() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());

        save_report(&storage, "report.json", &sample_report())
            .await
            .unwrap();

        let data = std::fs::read(temp_dir.path().join("report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(json["additions"], 1);
        assert_eq!(json["skipped"][0]["reason"], "item_not_found");
        assert_eq!(json["skipped"][0]["knowledge_base_id"], "Q42");
    }
}
