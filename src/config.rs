use crate::models::stock::DateRange;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TICKERS: [&str; 5] = ["AAPL", "NVDA", "TSLA", "AMZN", "AMD"];
pub const DEFAULT_START_DATE: &str = "2011-01-01";
pub const DEFAULT_END_DATE: &str = "2021-12-31";
pub const DEFAULT_DATA_DIR: &str = "../data";
pub const DEFAULT_BUCKET: &str = "stock-price-history";
pub const DEFAULT_CREDENTIALS_PATH: &str = "../credentials/service_account.json";

pub struct Config {
    pub data_dir: PathBuf,
    pub tickers: Vec<String>,
    pub date_range: DateRange,
    pub bucket: String,
    pub credentials_path: PathBuf,
    pub request_timeout: Option<Duration>,  // None 表示不设超时
}

impl Config {
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            date_range: default_date_range(),
            bucket: DEFAULT_BUCKET.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            request_timeout: None,
        }
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = PathBuf::from(dir);
        self
    }

    pub fn with_tickers(mut self, tickers: Vec<String>) -> Self {
        self.tickers = tickers;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = bucket.to_string();
        self
    }

    pub fn with_credentials_path(mut self, path: &str) -> Self {
        self.credentials_path = PathBuf::from(path);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_date_range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2011, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2021, 12, 31).unwrap_or(NaiveDate::MIN),
    )
}
