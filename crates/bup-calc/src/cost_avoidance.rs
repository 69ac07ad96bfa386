//! 成本規避（延後採購的資金成本節省）

use bup_core::config::{SENSITIVITY_MAX_PCT, SENSITIVITY_MIN_PCT};
use bup_core::{BupError, Scenario, ScenarioId, YearMonth};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::curves::ScenarioCurves;

/// 複利換算後的折現率（皆為百分比）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountRates {
    pub annual_pct: Decimal,
    /// (1 + 年利率)^(1/12) − 1
    pub monthly_pct: Decimal,
    /// (1 + 月利率)^(1/30) − 1
    pub daily_pct: Decimal,
}

impl DiscountRates {
    /// 由年化 WACC 換算月、日複利率
    pub fn from_annual_pct(annual_pct: Decimal) -> bup_core::Result<Self> {
        let invalid = || BupError::InvalidDiscountRate(format!("WACC {}%", annual_pct));

        if annual_pct <= Decimal::from(-100) {
            return Err(invalid());
        }

        let annual = annual_pct.to_f64().ok_or_else(invalid)?;
        let monthly = ((1.0 + annual / 100.0).powf(1.0 / 12.0) - 1.0) * 100.0;
        let daily = ((1.0 + monthly / 100.0).powf(1.0 / 30.0) - 1.0) * 100.0;

        let to_decimal = |value: f64| {
            Decimal::from_f64(value)
                .map(|d| d.round_dp(12))
                .ok_or_else(invalid)
        };

        Ok(Self {
            annual_pct,
            monthly_pct: to_decimal(monthly)?,
            daily_pct: to_decimal(daily)?,
        })
    }
}

/// 比較表的一列（一個月）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostponementRow {
    pub month: YearMonth,
    /// 效率曲線累計取得成本（沿用最後已知值）
    pub accum_acq_cost_eff: Decimal,
    /// 假設性曲線累計取得成本（依到貨月份）
    pub accum_acq_cost_hyp: Decimal,
    /// 假設性一次採購金額：只出現在假設性下單月份
    pub hypothetical_purchase: Decimal,
    /// 尚未支出的資金：假設性下單月份之前為 0
    pub raw_postponed_amount: Decimal,
    /// 當月節省 = 未支出資金 × 月利率
    pub postponed_savings: Decimal,
}

/// 單一情境的成本規避結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostAvoidance {
    pub scenario_id: ScenarioId,
    pub hypothetical_order_month: YearMonth,
    pub rows: Vec<PostponementRow>,
    /// Σ 每月節省，四捨五入至分
    pub total_savings: Decimal,
}

impl CostAvoidance {
    /// 是否有月份的效率曲線累計支出超過一次採購金額
    pub fn has_negative_postponement(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.raw_postponed_amount < Decimal::ZERO)
    }
}

/// 成本規避計算器
pub struct CostAvoidanceCalculator;

impl CostAvoidanceCalculator {
    /// 比較效率曲線累計支出與假設性一次採購
    ///
    /// 比較軸為兩條曲線月份範圍的聯集。不假設累計支出一定低於 `bup_cost`：
    /// 超過時未支出資金為負值，只影響假設性下單月份之後的月份。
    pub fn calculate(
        scenario: &Scenario,
        curves: &ScenarioCurves,
        bup_cost: Decimal,
        rates: &DiscountRates,
    ) -> CostAvoidance {
        let hypothetical_order_month = YearMonth::of(scenario.hypothetical_order_date());
        let monthly_rate = rates.monthly_pct / Decimal::ONE_HUNDRED;

        let axis: BTreeSet<YearMonth> = curves
            .efficient
            .points
            .iter()
            .chain(curves.hypothetical.points.iter())
            .map(|p| p.month)
            .collect();

        let rows: Vec<PostponementRow> = axis
            .into_iter()
            .map(|month| {
                let accum_acq_cost_eff = curves.efficient.accum_acq_cost_at(month);
                let raw_postponed_amount = if month >= hypothetical_order_month {
                    bup_cost - accum_acq_cost_eff
                } else {
                    Decimal::ZERO
                };

                PostponementRow {
                    month,
                    accum_acq_cost_eff,
                    accum_acq_cost_hyp: curves.hypothetical.accum_acq_cost_at(month),
                    hypothetical_purchase: if month == hypothetical_order_month {
                        bup_cost
                    } else {
                        Decimal::ZERO
                    },
                    raw_postponed_amount,
                    postponed_savings: raw_postponed_amount * monthly_rate,
                }
            })
            .collect();

        let total_savings = rows
            .iter()
            .map(|r| r.postponed_savings)
            .sum::<Decimal>()
            .round_dp(2);

        CostAvoidance {
            scenario_id: scenario.id,
            hypothetical_order_month,
            rows,
            total_savings,
        }
    }
}

/// 採購週期敏感度模擬結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensitivityOutcome {
    /// 實際採用的效率變動（已限制在 ±50%）
    pub efficiency_change_pct: f64,
    /// 模擬後的採購週期（天）
    pub simulated_length_days: i64,
    /// 縮短（正）或延長（負）的天數
    pub delta_days: i64,
    /// 正值為額外節省，負值為額外成本
    pub incremental_amount: Decimal,
}

impl SensitivityOutcome {
    pub fn is_gain(&self) -> bool {
        self.efficiency_change_pct >= 0.0
    }
}

/// 效率變動對基準採購週期的影響，以日利率換算為金額
pub fn simulate_procurement_length(
    baseline_days: u32,
    efficiency_change_pct: f64,
    daily_pct: Decimal,
    bup_cost: Decimal,
) -> SensitivityOutcome {
    let pct = if efficiency_change_pct.is_nan() {
        0.0
    } else {
        efficiency_change_pct.clamp(SENSITIVITY_MIN_PCT, SENSITIVITY_MAX_PCT)
    };
    let baseline = f64::from(baseline_days);

    let simulated_length_days = (baseline * (1.0 - pct / 100.0)).trunc() as i64;
    let delta_days = (baseline * (pct / 100.0)).trunc() as i64;

    let incremental_amount =
        Decimal::from(delta_days) * (daily_pct / Decimal::ONE_HUNDRED) * bup_cost;

    SensitivityOutcome {
        efficiency_change_pct: pct,
        simulated_length_days,
        delta_days,
        incremental_amount,
    }
}
