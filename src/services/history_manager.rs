use crate::errors::Result;
use crate::models::stock::PriceSeries;
use crate::providers::base::PriceProvider;
use crate::services::{PersistOutcome, UploadOutcome};
use crate::storage::ObjectStore;
use crate::util::{self, csv_utils};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 全量历史：本地缓存后同步到 bucket
pub struct HistoryManager {
    provider: Arc<dyn PriceProvider + Send + Sync>,
    store: Arc<dyn ObjectStore + Send + Sync>,
    data_dir: PathBuf,
}

impl HistoryManager {
    pub fn new(
        provider: Arc<dyn PriceProvider + Send + Sync>,
        store: Arc<dyn ObjectStore + Send + Sync>,
        data_dir: &Path,
    ) -> Self {
        Self {
            provider,
            store,
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn output_path(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(util::history_file_name(ticker))
    }

    pub async fn fetch(&self, ticker: &str) -> Result<PriceSeries> {
        self.provider.fetch_max(ticker).await
    }

    pub async fn persist(&self, ticker: &str) -> Result<PersistOutcome> {
        let path = self.output_path(ticker);

        if path.exists() {
            info!("{} already exists... skipping", path.display());
            return Ok(PersistOutcome::Skipped(path));
        }

        info!("Fetching full history for {} via {}", ticker, self.provider.name());
        let series = self.fetch(ticker).await?;
        csv_utils::save_price_series_to_csv(&series, &path)?;

        Ok(PersistOutcome::Written(path))
    }

    /// 对象名取本地文件名；bucket 中已存在则跳过
    pub async fn upload(&self, local_path: &Path) -> Result<UploadOutcome> {
        let name = util::object_name_for(local_path)?;

        if self.store.exists(&name).await? {
            info!("gs://{}/{} already exists... skipping", self.store.bucket(), name);
            return Ok(UploadOutcome::Skipped(name));
        }

        self.store.upload(&name, local_path).await?;
        info!("Uploaded {} to gs://{}/{}", local_path.display(), self.store.bucket(), name);

        Ok(UploadOutcome::Uploaded(name))
    }
}
