#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use stock_datagen::{DailyBar, DataGenError, ObjectStore, PriceProvider, PriceSeries, Result};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Returns `rows` synthetic bars per call and counts calls
pub struct StubProvider {
    rows: usize,
    failing: Option<String>,
    pub range_calls: AtomicUsize,
    pub max_calls: AtomicUsize,
    pub requested: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            failing: None,
            range_calls: AtomicUsize::new(0),
            max_calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request for `ticker` as an unknown symbol
    pub fn failing_on(mut self, ticker: &str) -> Self {
        self.failing = Some(ticker.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst) + self.max_calls.load(Ordering::SeqCst)
    }

    fn series(&self, ticker: &str, start: NaiveDate) -> Result<PriceSeries> {
        self.requested.lock().unwrap().push(ticker.to_string());
        if self.failing.as_deref() == Some(ticker) {
            return Err(DataGenError::SymbolNotFound(ticker.to_string()));
        }

        let bars = (0..self.rows)
            .map(|i| {
                let price = 10.0 + i as f64;
                DailyBar {
                    date: start + Duration::days(i as i64),
                    open: Some(price),
                    high: Some(price + 0.5),
                    low: Some(price - 0.5),
                    close: Some(price + 0.25),
                    adj_close: Some(price + 0.25),
                    volume: Some(1000 + i as u64),
                }
            })
            .collect();
        Ok(PriceSeries::new(ticker, bars))
    }
}

#[async_trait]
impl PriceProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_range(&self, ticker: &str, start: NaiveDate, _end: NaiveDate) -> Result<PriceSeries> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        self.series(ticker, start)
    }

    async fn fetch_max(&self, ticker: &str) -> Result<PriceSeries> {
        self.max_calls.fetch_add(1, Ordering::SeqCst);
        self.series(ticker, date(1990, 1, 2))
    }
}

/// In-memory bucket keyed by object name
pub struct MemoryStore {
    objects: Mutex<HashSet<String>>,
    failing_upload: Option<String>,
    pub uploads: AtomicUsize,
    pub exists_checks: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashSet::new()),
            failing_upload: None,
            uploads: AtomicUsize::new(0),
            exists_checks: AtomicUsize::new(0),
        }
    }

    pub fn with_object(self, name: &str) -> Self {
        self.objects.lock().unwrap().insert(name.to_string());
        self
    }

    /// Rejects every upload of object `name`
    pub fn failing_upload_for(mut self, name: &str) -> Self {
        self.failing_upload = Some(name.to_string());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.lock().unwrap().contains(name)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn exists_count(&self) -> usize {
        self.exists_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        "test-bucket"
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        self.exists_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.contains(name))
    }

    async fn upload(&self, name: &str, local_path: &Path) -> Result<()> {
        // 上传前文件必须存在
        std::fs::metadata(local_path)?;
        if self.failing_upload.as_deref() == Some(name) {
            return Err(DataGenError::StorageError(format!("upload of {} rejected", name)));
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(name.to_string());
        Ok(())
    }
}
