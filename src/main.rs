use clap::Parser;
use oabot::core::report;
use oabot::utils::{logger, validation::Validate};
use oabot::{
    BotError, BotSettings, CliArgs, CsvRecordSource, DryRunWriter, FatcatClient, LinkChecker,
    LocalStorage, OaBot, WikidataClient,
};

fn fail(e: &BotError) -> ! {
    tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting oabot");
    tracing::debug!("CLI args: {:?}", args);

    if let Err(e) = args.validate() {
        fail(&e);
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    let client = match config.http_client() {
        Ok(client) => client,
        Err(e) => fail(&e),
    };

    // 輸入檔路徑直接交給 storage，不另外加 base path
    let storage = LocalStorage::new("");
    let bot = OaBot::new(
        CsvRecordSource::new(storage.clone(), args.input.clone()),
        FatcatClient::new(client.clone(), config.open_access.endpoint.clone()),
        WikidataClient::new(client.clone(), config.knowledge_base.endpoint.clone()),
        DryRunWriter::new(),
        LinkChecker::with_resolver(client, config.checks.doi_resolver.clone()),
        BotSettings::from(&config.checks),
    );

    let run = match bot.run_bot().await {
        Ok(run) => run,
        Err(e) => fail(&e),
    };

    if let Err(e) = report::print_summary(&run) {
        tracing::warn!("Could not print summary: {}", e);
    }

    if let Some(path) = &args.report {
        match report::save_report(&storage, path, &run).await {
            Ok(()) => tracing::info!("📁 Report saved to: {}", path),
            Err(e) => fail(&e),
        }
    }
}
