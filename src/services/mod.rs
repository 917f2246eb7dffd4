pub mod range_fetcher;
pub mod history_manager;

use crate::errors::Result;
use crate::models::stock::DateRange;
use history_manager::HistoryManager;
use log::info;
use range_fetcher::RangeFetcher;
use std::path::PathBuf;

/// 本地文件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

impl PersistOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            PersistOutcome::Written(path) | PersistOutcome::Skipped(path) => path,
        }
    }
}

/// 远端对象的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(String),
    Skipped(String),
}

/// Counts of what a driver run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub skipped: usize,
    pub uploaded: usize,
    pub upload_skipped: usize,
}

impl RunSummary {
    fn record_persist(&mut self, outcome: &PersistOutcome) {
        match outcome {
            PersistOutcome::Written(_) => self.written += 1,
            PersistOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    fn record_upload(&mut self, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::Uploaded(_) => self.uploaded += 1,
            UploadOutcome::Skipped(_) => self.upload_skipped += 1,
        }
    }
}

/// 依次为每个 ticker 生成固定区间的 CSV，任一失败即中止
pub async fn run_fixed_range(fetcher: &RangeFetcher, tickers: &[String], range: &DateRange) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for ticker in tickers {
        let outcome = fetcher.persist(ticker, &range.start, &range.end).await?;
        summary.record_persist(&outcome);
    }

    info!("Fixed-range run finished: {} written, {} skipped", summary.written, summary.skipped);
    Ok(summary)
}

/// 依次为每个 ticker 生成全量历史 CSV 并上传，任一失败即中止
pub async fn run_full_history(manager: &HistoryManager, tickers: &[String]) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for ticker in tickers {
        let outcome = manager.persist(ticker).await?;
        summary.record_persist(&outcome);

        let upload = manager.upload(outcome.path()).await?;
        summary.record_upload(&upload);
    }

    info!(
        "Full-history run finished: {} written, {} skipped, {} uploaded, {} already in bucket",
        summary.written, summary.skipped, summary.uploaded, summary.upload_skipped
    );
    Ok(summary)
}
