use crate::config::toml_config::BotConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "oabot")]
#[command(about = "Propose open access full text URLs for Wikidata scholarly items")]
pub struct CliArgs {
    /// CSV file with `knowledge_base_id,doi` rows
    #[arg(short, long)]
    pub input: String,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the open access lookup endpoint
    #[arg(long)]
    pub open_access_endpoint: Option<String>,

    /// Override the Wikidata endpoint
    #[arg(long)]
    pub knowledge_base_endpoint: Option<String>,

    /// Override the maximum number of existing full text URLs
    #[arg(long)]
    pub max_fulltext: Option<usize>,

    /// Check that each candidate URL answers with HTTP 200
    #[arg(long)]
    pub verify_links: bool,

    /// Check that each DOI resolves to itself via doi.org
    #[arg(long)]
    pub verify_doi: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliArgs {
    /// 讀取設定檔（若有），再套用命令列覆蓋
    pub fn load_config(&self) -> Result<BotConfig> {
        let mut config = match &self.config {
            Some(path) => BotConfig::from_file(path)?,
            None => BotConfig::default(),
        };

        if let Some(endpoint) = &self.open_access_endpoint {
            config.open_access.endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.knowledge_base_endpoint {
            config.knowledge_base.endpoint = endpoint.clone();
        }
        if let Some(max) = self.max_fulltext {
            config.checks.max_fulltext_statements = max;
        }
        if self.verify_links {
            config.checks.verify_links = true;
        }
        if self.verify_doi {
            config.checks.verify_doi_resolution = true;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &["csv"])?;
        if let Some(report) = &self.report {
            validate_path("report", report)?;
        }
        Ok(())
    }
}
