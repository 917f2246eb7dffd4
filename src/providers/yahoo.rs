use crate::models::stock::{DailyBar, PriceSeries};
use crate::errors::{Result, DataGenError};
use crate::providers::base::PriceProvider;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// 查询参数：指定区间或全部历史
enum ChartQuery {
    Range { start: NaiveDate, end: NaiveDate },
    Max,
}

/// Yahoo Finance v8 chart API 数据源
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// 创建新的 Yahoo 数据源，`timeout` 为 None 时请求不设超时
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DataGenError::RequestError)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at another chart endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn query_params(query: &ChartQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("interval", "1d".to_string()),
            ("includeAdjustedClose", "true".to_string()),
            ("events", "div,split".to_string()),
        ];
        match query {
            ChartQuery::Range { start, end } => {
                params.push(("period1", midnight_utc(start).to_string()));
                params.push(("period2", midnight_utc(end).to_string()));
            }
            ChartQuery::Max => params.push(("range", "max".to_string())),
        }
        params
    }

    async fn fetch_chart(&self, ticker: &str, query: ChartQuery) -> Result<PriceSeries> {
        let url = format!("{}/{}", self.base_url, ticker);
        debug!("Requesting {} with {:?}", url, Self::query_params(&query));

        let response = self.client
            .get(&url)
            .query(&Self::query_params(&query))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // 错误响应同样带有 chart.error 字段，优先解析
        let chart: ChartResponse = match serde_json::from_str(&text) {
            Ok(chart) => chart,
            Err(e) if !status.is_success() => {
                return Err(DataGenError::ProviderError(format!(
                    "HTTP {} for {}: {}", status, ticker, e
                )));
            }
            Err(e) => return Err(DataGenError::JsonError(e)),
        };

        let series = Self::parse_response(ticker, chart)?;
        info!("Fetched {} daily bars for {}", series.len(), ticker);
        Ok(series)
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<PriceSeries> {
        let result = match (resp.chart.result, resp.chart.error) {
            (_, Some(err)) if err.code == "Not Found" => {
                return Err(DataGenError::SymbolNotFound(ticker.to_string()));
            }
            (_, Some(err)) => {
                return Err(DataGenError::ProviderError(format!("{}: {}", err.code, err.description)));
            }
            (Some(result), None) => result,
            (None, None) => {
                return Err(DataGenError::ProviderError("empty result with no error".to_string()));
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataGenError::ProviderError("result array is empty".to_string()))?;

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        // 无交易数据时 Yahoo 省略 timestamp 字段
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose)
            .unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| DataGenError::ProviderError(format!("invalid timestamp: {}", ts)))?;

            let bar = DailyBar {
                date,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: quote.close.get(i).copied().flatten(),
                adj_close: adj_closes.get(i).copied().flatten(),
                volume: quote.volume.get(i).copied().flatten(),
            };

            // 全部为空的是非交易日占位
            if bar.open.is_none()
                && bar.high.is_none()
                && bar.low.is_none()
                && bar.close.is_none()
                && bar.volume.is_none()
            {
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(PriceSeries::new(ticker, bars))
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn fetch_range(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        info!("Fetching {} from {} to {}", ticker, start, end);
        self.fetch_chart(ticker, ChartQuery::Range { start, end }).await
    }

    async fn fetch_max(&self, ticker: &str) -> Result<PriceSeries> {
        info!("Fetching full history for {}", ticker);
        self.fetch_chart(ticker, ChartQuery::Max).await
    }
}

fn midnight_utc(date: &NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
