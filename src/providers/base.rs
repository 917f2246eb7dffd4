use crate::models::stock::PriceSeries;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for market-data providers
#[async_trait]
pub trait PriceProvider {
    /// Provider name used in log lines
    fn name(&self) -> &'static str;

    /// Fetch daily bars in `[start, end)`
    async fn fetch_range(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;

    /// Fetch the maximum available daily history
    async fn fetch_max(&self, ticker: &str) -> Result<PriceSeries>;
}
