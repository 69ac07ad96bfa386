//! 分析配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BupError, Result};

/// 外部資料無法解析提前期時的預設值（天）
pub const DEFAULT_LEADTIME_DAYS: u32 = 127;

/// 敏感度模擬的基準採購週期（天）
pub const DEFAULT_SENSITIVITY_BASELINE_DAYS: u32 = 355;

/// 效率變動滑桿的範圍（百分比）
pub const SENSITIVITY_MIN_PCT: f64 = -50.0;
pub const SENSITIVITY_MAX_PCT: f64 = 50.0;

/// 整個工作階段共用的分析參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 年化資金成本 WACC（百分比，例如 5.42 表示 5.42%）
    pub wacc_pct: Decimal,

    /// 敏感度模擬的基準採購週期（天）
    pub sensitivity_baseline_days: u32,

    /// 提前期缺失時的預設值（天）
    pub default_leadtime_days: u32,
}

impl AnalysisConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            wacc_pct: Decimal::new(542, 2),
            sensitivity_baseline_days: DEFAULT_SENSITIVITY_BASELINE_DAYS,
            default_leadtime_days: DEFAULT_LEADTIME_DAYS,
        }
    }

    /// 建構器模式：設置 WACC
    pub fn with_wacc_pct(mut self, wacc_pct: Decimal) -> Self {
        self.wacc_pct = wacc_pct;
        self
    }

    /// 建構器模式：設置敏感度基準天數
    pub fn with_sensitivity_baseline_days(mut self, days: u32) -> Self {
        self.sensitivity_baseline_days = days;
        self
    }

    /// 建構器模式：設置預設提前期
    pub fn with_default_leadtime_days(mut self, days: u32) -> Self {
        self.default_leadtime_days = days;
        self
    }

    /// 檢查配置是否可用於計算
    ///
    /// WACC 必須大於 -100%，否則複利換算沒有意義。
    pub fn validate(&self) -> Result<()> {
        if self.wacc_pct <= Decimal::from(-100) {
            return Err(BupError::InvalidDiscountRate(format!(
                "WACC {}% 必須大於 -100%",
                self.wacc_pct
            )));
        }
        Ok(())
    }

    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BupError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BupError::Config(e.to_string()))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}
