pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::BotConfig;

pub use adapters::{
    csv_input::CsvRecordSource, fatcat::FatcatClient, storage::LocalStorage,
    wikidata::{DryRunWriter, WikidataClient},
};
pub use crate::core::bot::{BotSettings, OaBot};
pub use crate::core::sanity::{sensible_url, validate_doi, LinkChecker};
pub use utils::error::{BotError, Result};
