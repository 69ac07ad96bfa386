//! # BUP Calculation Engine
//!
//! 建置曲線、成本規避與批次分配的計算引擎

pub mod batching;
pub mod bucketing;
pub mod calculator;
pub mod cost_avoidance;
pub mod curves;
pub mod schedule;
pub mod stats;

// Re-export 主要類型
pub use batching::{BatchAssigner, BatchLabel, BatchOutcome, BatchReport};
pub use calculator::BuildUpCalculator;
pub use cost_avoidance::{CostAvoidance, DiscountRates, SensitivityOutcome};
pub use curves::{Curve, CurvePoint, ScenarioCurves};
pub use schedule::{Combination, PartSchedule, ScheduleDeriver};
pub use stats::LeadtimeStats;

use bup_core::{BupError, ScenarioId};
use rust_decimal::Decimal;
use serde::Serialize;

/// BUP 計算結果（每次重算產生一份新的）
#[derive(Debug, Clone, Serialize)]
pub struct BuildUpResult {
    /// 本次計算的識別碼
    pub run_id: uuid::Uuid,

    /// 料號 × 情境組合
    pub combinations: Vec<Combination>,

    /// 各情境結果（依情境 id 順序）
    pub scenarios: Vec<ScenarioResult>,

    /// 範圍總價 Σ 數量 × 單位成本
    pub bup_cost: Decimal,

    pub rates: DiscountRates,

    /// 敏感度模擬的基準採購週期（天）
    pub sensitivity_baseline_days: u32,

    pub leadtime_stats: Option<LeadtimeStats>,

    /// 警告信息
    pub warnings: Vec<AnalysisWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl BuildUpResult {
    /// 創建空的計算結果
    pub fn empty(rates: &DiscountRates, sensitivity_baseline_days: u32) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4(),
            combinations: Vec::new(),
            scenarios: Vec::new(),
            bup_cost: Decimal::ZERO,
            rates: *rates,
            sensitivity_baseline_days,
            leadtime_stats: None,
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: AnalysisWarning) {
        self.warnings.push(warning);
    }

    pub fn scenario(&self, id: ScenarioId) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.scenario_id == id)
    }

    /// 各情境節省金額合計
    pub fn total_savings(&self) -> Decimal {
        self.scenarios
            .iter()
            .map(|s| s.cost_avoidance.total_savings)
            .sum()
    }

    /// 以本次的基準週期、日利率與總價模擬效率變動
    pub fn sensitivity(&self, efficiency_change_pct: f64) -> SensitivityOutcome {
        cost_avoidance::simulate_procurement_length(
            self.sensitivity_baseline_days,
            efficiency_change_pct,
            self.rates.daily_pct,
            self.bup_cost,
        )
    }

    /// 匯出組合表（JSON 陣列，每筆一個扁平紀錄）
    pub fn combinations_json(&self) -> bup_core::Result<String> {
        serde_json::to_string_pretty(&self.combinations).map_err(|e| BupError::Export(e.to_string()))
    }
}

/// 單一情境的計算結果
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_id: ScenarioId,
    /// 圖表顏色，由 id 決定
    pub color: &'static str,
    pub curves: ScenarioCurves,
    pub cost_avoidance: CostAvoidance,
    pub batches: BatchOutcome,
}

/// 分析警告
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisWarning {
    pub scenario_id: ScenarioId,
    pub message: String,
    pub severity: WarningSeverity,
}

impl AnalysisWarning {
    pub fn new(scenario_id: ScenarioId, message: String, severity: WarningSeverity) -> Self {
        Self {
            scenario_id,
            message,
            severity,
        }
    }

    pub fn info(scenario_id: ScenarioId, message: String) -> Self {
        Self::new(scenario_id, message, WarningSeverity::Info)
    }

    pub fn warning(scenario_id: ScenarioId, message: String) -> Self {
        Self::new(scenario_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
