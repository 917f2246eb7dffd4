use chrono::NaiveDate;
use serde::Serialize;

/// 日线数据，缺失值以 `None` 表示，写出时为空字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Adj Close")]
    pub adj_close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
}

/// Price history for one ticker, ordered by date ascending
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(ticker: &str, bars: Vec<DailyBar>) -> Self {
        Self {
            ticker: ticker.to_string(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// 日期区间，`end` 不包含在内
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 解析 `YYYY-MM-DD` 格式的起止日期
    pub fn parse(start: &str, end: &str) -> crate::errors::Result<Self> {
        Ok(Self {
            start: NaiveDate::parse_from_str(start, "%Y-%m-%d")?,
            end: NaiveDate::parse_from_str(end, "%Y-%m-%d")?,
        })
    }
}
