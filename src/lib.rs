// 公开导出的模块，供外部使用
pub mod models;
pub mod providers;
pub mod storage;
pub mod services;
pub mod errors;
pub mod config;
pub mod util;

// 重新导出常用类型，方便使用
pub use models::stock::{DailyBar, DateRange, PriceSeries};
pub use providers::base::PriceProvider;
pub use storage::ObjectStore;
pub use services::{PersistOutcome, UploadOutcome, RunSummary};
pub use services::range_fetcher::RangeFetcher;
pub use services::history_manager::HistoryManager;
pub use errors::{Result, DataGenError};
