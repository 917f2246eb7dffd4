use crate::errors::Result;
use crate::models::stock::PriceSeries;
use crate::providers::base::PriceProvider;
use crate::services::PersistOutcome;
use crate::util::{self, csv_utils};
use chrono::NaiveDate;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 固定区间抓取：每个 (ticker, start, end) 对应一个 CSV
pub struct RangeFetcher {
    provider: Arc<dyn PriceProvider + Send + Sync>,
    data_dir: PathBuf,
}

impl RangeFetcher {
    pub fn new(provider: Arc<dyn PriceProvider + Send + Sync>, data_dir: &Path) -> Self {
        Self {
            provider,
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn output_path(&self, ticker: &str, start: &NaiveDate, end: &NaiveDate) -> PathBuf {
        self.data_dir.join(util::range_file_name(ticker, start, end))
    }

    /// Fetch `[start, end)` from the provider, errors pass through untouched
    pub async fn fetch(&self, ticker: &str, start: &NaiveDate, end: &NaiveDate) -> Result<PriceSeries> {
        self.provider.fetch_range(ticker, *start, *end).await
    }

    /// 文件已存在则跳过，否则抓取并写入
    pub async fn persist(&self, ticker: &str, start: &NaiveDate, end: &NaiveDate) -> Result<PersistOutcome> {
        let path = self.output_path(ticker, start, end);

        if path.exists() {
            info!("{} already exists... skipping", path.display());
            return Ok(PersistOutcome::Skipped(path));
        }

        info!("Fetching {} via {}", ticker, self.provider.name());
        let series = self.fetch(ticker, start, end).await?;
        csv_utils::save_price_series_to_csv(&series, &path)?;

        Ok(PersistOutcome::Written(path))
    }
}
