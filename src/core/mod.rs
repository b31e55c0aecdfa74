pub mod bot;
pub mod report;
pub mod sanity;

pub use crate::domain::model::{Decision, InputRecord, RunReport};
pub use crate::domain::ports::{KnowledgeBaseReader, KnowledgeBaseWriter, OpenAccessLookup, RecordSource};
pub use crate::utils::error::Result;
