//! # BUP Core
//!
//! 備件建置計劃（Build-Up Plan）的核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod input;
pub mod part;
pub mod scenario;

// Re-export 主要類型
pub use calendar::YearMonth;
pub use config::AnalysisConfig;
pub use input::{PartRecord, ScenarioForm};
pub use part::{MaterialType, Part, PartCatalog};
pub use scenario::{BatchPlan, ProcurementPipeline, Scenario, ScenarioDraft, ScenarioId, ScenarioStore};

/// BUP 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BupError {
    #[error("無效的日期 ({field}): {value}（格式應為 DD/MM/YYYY）")]
    InvalidDate { field: String, value: String },

    #[error("無效的數字 ({field}): {value}")]
    InvalidNumber { field: String, value: String },

    #[error("必填欄位為空: {0}")]
    EmptyField(String),

    #[error("交貨區間無效: 結束月份 {end} 早於開始月份 {start}")]
    InvalidDeliveryWindow { start: u32, end: u32 },

    #[error("無效的折現率: {0}")]
    InvalidDiscountRate(String),

    #[error("找不到情境: {0}")]
    ScenarioNotFound(u32),

    #[error("匯出失敗: {0}")]
    Export(String),

    #[error("配置解析錯誤: {0}")]
    Config(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

impl BupError {
    /// 錯誤對應的輸入欄位（供介面層標示）
    pub fn field(&self) -> Option<&str> {
        match self {
            BupError::InvalidDate { field, .. } | BupError::InvalidNumber { field, .. } => {
                Some(field)
            }
            BupError::EmptyField(field) => Some(field),
            BupError::InvalidDeliveryWindow { .. } => Some("material_delivery_end"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BupError>;
