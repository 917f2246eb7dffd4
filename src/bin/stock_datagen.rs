use stock_datagen::config::{
    Config, DEFAULT_BUCKET, DEFAULT_CREDENTIALS_PATH, DEFAULT_DATA_DIR, DEFAULT_END_DATE,
    DEFAULT_START_DATE,
};
use stock_datagen::models::stock::DateRange;
use stock_datagen::providers::base::PriceProvider;
use stock_datagen::providers::yahoo::YahooProvider;
use stock_datagen::services::{self, history_manager::HistoryManager, range_fetcher::RangeFetcher};
use stock_datagen::storage::gcs::GcsStore;
use stock_datagen::storage::ObjectStore;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::sync::Arc;
use std::time::Duration;

fn with_common_args(app: App<'static>) -> App<'static> {
    app.arg(
        Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("Directory the CSV files are written to")
            .takes_value(true)
            .default_value(DEFAULT_DATA_DIR),
    )
    .arg(
        Arg::with_name("tickers")
            .short('t')
            .long("tickers")
            .value_name("TICKERS")
            .help("Comma separated ticker list [default: AAPL,NVDA,TSLA,AMZN,AMD]")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("timeout")
            .long("timeout")
            .value_name("SECS")
            .help("Per-request timeout in seconds (no timeout when omitted)")
            .takes_value(true),
    )
}

/// 从命令行参数构建配置
fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = Config::new()
        .with_data_dir(matches.value_of("data-dir").unwrap_or(DEFAULT_DATA_DIR));

    if let Some(tickers) = matches.value_of("tickers") {
        let tickers = tickers
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        config = config.with_tickers(tickers);
    }

    if let Some(timeout) = matches.value_of("timeout") {
        let secs = timeout
            .parse::<u64>()
            .with_context(|| format!("Invalid timeout: {}", timeout))?;
        config = config.with_request_timeout(Some(Duration::from_secs(secs)));
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 未设置 RUST_LOG 时默认输出 info，保证跳过提示可见
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let range_cmd = SubCommand::with_name("range")
        .about("Download a fixed date range per ticker into {ticker}_{start}_{end}.csv")
        .arg(
            Arg::with_name("start")
                .short('s')
                .long("start")
                .value_name("DATE")
                .help("First date to fetch (YYYY-MM-DD)")
                .takes_value(true)
                .default_value(DEFAULT_START_DATE),
        )
        .arg(
            Arg::with_name("end")
                .short('e')
                .long("end")
                .value_name("DATE")
                .help("End date, exclusive (YYYY-MM-DD)")
                .takes_value(true)
                .default_value(DEFAULT_END_DATE),
        );

    let history_cmd = SubCommand::with_name("history")
        .about("Download full history per ticker into {ticker}_data.csv and upload it to the bucket")
        .arg(
            Arg::with_name("bucket")
                .short('b')
                .long("bucket")
                .value_name("BUCKET")
                .help("Bucket to upload to")
                .takes_value(true)
                .default_value(DEFAULT_BUCKET),
        )
        .arg(
            Arg::with_name("credentials")
                .short('c')
                .long("credentials")
                .value_name("FILE")
                .help("Service account key file")
                .takes_value(true)
                .default_value(DEFAULT_CREDENTIALS_PATH),
        );

    let app = App::new("stock_datagen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Historical stock price downloader")
        .subcommand(with_common_args(range_cmd))
        .subcommand(with_common_args(history_cmd));

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("range") {
        let range = DateRange::parse(
            matches.value_of("start").unwrap_or(DEFAULT_START_DATE),
            matches.value_of("end").unwrap_or(DEFAULT_END_DATE),
        )?;
        let config = build_config(matches)?.with_date_range(range);

        let provider: Arc<dyn PriceProvider + Send + Sync> =
            Arc::new(YahooProvider::new(config.request_timeout)?);
        let fetcher = RangeFetcher::new(provider, &config.data_dir);

        info!(
            "Fetching {} tickers from {} to {} into {}",
            config.tickers.len(), range.start, range.end, config.data_dir.display()
        );
        services::run_fixed_range(&fetcher, &config.tickers, &config.date_range).await?;
    } else if let Some(matches) = matches.subcommand_matches("history") {
        let config = build_config(matches)?
            .with_bucket(matches.value_of("bucket").unwrap_or(DEFAULT_BUCKET))
            .with_credentials_path(matches.value_of("credentials").unwrap_or(DEFAULT_CREDENTIALS_PATH));

        let provider: Arc<dyn PriceProvider + Send + Sync> =
            Arc::new(YahooProvider::new(config.request_timeout)?);
        let store: Arc<dyn ObjectStore + Send + Sync> = Arc::new(
            GcsStore::from_service_account_file(&config.credentials_path, &config.bucket, config.request_timeout)
                .with_context(|| format!("Cannot create storage client for bucket {}", config.bucket))?,
        );
        let manager = HistoryManager::new(provider, store, &config.data_dir);

        info!(
            "Syncing full history for {} tickers into {} and gs://{}",
            config.tickers.len(), config.data_dir.display(), config.bucket
        );
        services::run_full_history(&manager, &config.tickers).await?;
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
