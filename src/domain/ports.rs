use crate::domain::model::{InputRecord, KnowledgeBaseItem, OpenAccessResult, Proposal};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn load_records(&self) -> Result<Vec<InputRecord>>;
}

#[async_trait]
pub trait OpenAccessLookup: Send + Sync {
    /// `Ok(None)` when the service knows no open access copy.
    async fn find_open_access(&self, doi: &str) -> Result<Option<OpenAccessResult>>;
}

#[async_trait]
pub trait KnowledgeBaseReader: Send + Sync {
    /// `Ok(None)` when no item exists at `id`.
    async fn fetch_item(&self, id: &str) -> Result<Option<KnowledgeBaseItem>>;
}

#[async_trait]
pub trait KnowledgeBaseWriter: Send + Sync {
    async fn add_full_text_url(&self, proposal: &Proposal) -> Result<()>;
}
