//! 提前期統計

use bup_core::PartCatalog;
use serde::Serialize;

/// 直方圖分箱數
pub const HISTOGRAM_BINS: usize = 20;

/// 直方圖的一個分箱 [lower, upper)，最後一箱含上界
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// 範圍內料號的提前期分佈
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadtimeStats {
    pub count: usize,
    pub mean: f64,
    /// 樣本標準差（n − 1）
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub histogram: Vec<HistogramBin>,
}

impl LeadtimeStats {
    /// 空目錄返回 None
    pub fn from_catalog(catalog: &PartCatalog) -> Option<Self> {
        let values: Vec<u32> = catalog.iter().map(|p| p.leadtime_days).collect();
        let min = values.iter().copied().min()?;
        let max = values.iter().copied().max()?;

        let count = values.len();
        let n = count as f64;
        let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let std_dev = if count < 2 {
            0.0
        } else {
            let variance = values
                .iter()
                .map(|&v| (f64::from(v) - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0);
            variance.sqrt()
        };

        Some(Self {
            count,
            mean,
            std_dev,
            min,
            max,
            histogram: histogram(&values, min, max),
        })
    }

    pub fn total_in_histogram(&self) -> usize {
        self.histogram.iter().map(|b| b.count).sum()
    }
}

fn histogram(values: &[u32], min: u32, max: u32) -> Vec<HistogramBin> {
    // 所有值相同時以 ±0.5 展開範圍
    let (lo, hi) = if min == max {
        (f64::from(min) - 0.5, f64::from(max) + 0.5)
    } else {
        (f64::from(min), f64::from(max))
    };
    let width = (hi - lo) / HISTOGRAM_BINS as f64;

    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == HISTOGRAM_BINS {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &value in values {
        let index = (((f64::from(value) - lo) / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[index].count += 1;
    }

    bins
}
