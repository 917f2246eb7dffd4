use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use crate::models::stock::PriceSeries;
use crate::errors::{Result, DataGenError};

// 文件命名规则
pub fn range_file_name(ticker: &str, start: &NaiveDate, end: &NaiveDate) -> String {
    format!(
        "{}_{}_{}.csv",
        ticker,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

pub fn history_file_name(ticker: &str) -> String {
    format!("{}_data.csv", ticker)
}

/// 取路径的文件名部分，作为远端对象名
pub fn object_name_for(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| DataGenError::StorageError(format!("No file name in path: {}", path.display())))
}

// CSV 工具
pub mod csv_utils {
    use super::*;

    /// 将价格序列写为 CSV，日期为第一列
    pub fn save_price_series_to_csv(series: &PriceSeries, path: &Path) -> Result<()> {
        info!("Saving {} daily records for {} to {}", series.len(), series.ticker, path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // 先写临时文件再改名，目标文件存在即代表写入完整
        let tmp_path = partial_path(path)?;
        if let Err(e) = write_csv(series, &tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    fn write_csv(series: &PriceSeries, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        if series.is_empty() {
            // serialize 在无记录时不会输出表头
            writer.write_record(["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"])?;
        }
        for bar in &series.bars {
            writer.serialize(bar)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 同目录下的临时文件，如 `.AAPL_data.csv.part`
    pub fn partial_path(path: &Path) -> Result<PathBuf> {
        let name = object_name_for(path)?;
        Ok(path.with_file_name(format!(".{}.part", name)))
    }
}
