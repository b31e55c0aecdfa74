use crate::domain::model::InputRecord;
use crate::domain::ports::{RecordSource, Storage};
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;

/// 從 CSV 讀入 `knowledge_base_id,doi`（也接受 `qid` 欄名）
pub struct CsvRecordSource<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> CsvRecordSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn parse(data: &[u8]) -> Result<Vec<InputRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<InputRecord>().enumerate() {
            let record = row?;
            if record.knowledge_base_id.is_empty() || record.doi.is_empty() {
                return Err(BotError::InputError {
                    message: format!("row {} has an empty id or DOI", index + 1),
                });
            }
            records.push(record);
        }

        Ok(records)
    }
}

#[async_trait]
impl<S: Storage> RecordSource for CsvRecordSource<S> {
    async fn load_records(&self) -> Result<Vec<InputRecord>> {
        tracing::debug!("Reading input records from {}", self.path);
        let data = self.storage.read_file(&self.path).await?;
        let records = Self::parse(&data)?;

        if records.is_empty() {
            tracing::warn!("⚠️ No records found in {}", self.path);
        } else {
            tracing::info!("📥 Loaded {} records from {}", records.len(), self.path);
        }

        Ok(records)
    }
}
