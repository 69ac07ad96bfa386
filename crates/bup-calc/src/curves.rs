//! 建置曲線（每月與累計）

use bup_core::{Scenario, ScenarioId, YearMonth};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::bucketing::{BucketingCalculator, CurveKind, MonthBucket};
use crate::schedule::Combination;

/// 曲線上的一個月
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    pub month: YearMonth,
    /// 當月組合筆數
    pub line_items: u64,
    pub accum_line_items: u64,
    /// 當月數量
    pub qty: u64,
    pub accum_qty: u64,
    /// 當月取得成本
    pub acq_cost: Decimal,
    pub accum_acq_cost: Decimal,
}

/// 累計值（掃描時攜帶）
#[derive(Debug, Clone, Copy, Default)]
struct Running {
    line_items: u64,
    qty: u64,
    acq_cost: Decimal,
}

/// 單一情境的一條曲線，月份連續且依時間排序
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Curve {
    pub kind: CurveKind,
    pub points: Vec<CurvePoint>,
}

impl Curve {
    /// 沒有任何組合時的空曲線
    pub fn empty(kind: CurveKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
        }
    }

    /// 把分桶結果左連接到完整月份序列，並以掃描累計
    pub fn build(
        kind: CurveKind,
        months: &[YearMonth],
        buckets: &BTreeMap<YearMonth, MonthBucket>,
    ) -> Self {
        let points = months
            .iter()
            .scan(Running::default(), |running, &month| {
                let bucket = buckets.get(&month).copied().unwrap_or_default();

                running.line_items += bucket.line_items;
                running.qty += bucket.qty;
                running.acq_cost += bucket.acq_cost;

                Some(CurvePoint {
                    month,
                    line_items: bucket.line_items,
                    accum_line_items: running.line_items,
                    qty: bucket.qty,
                    accum_qty: running.qty,
                    acq_cost: bucket.acq_cost,
                    accum_acq_cost: running.acq_cost,
                })
            })
            .collect();

        Self { kind, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.points.first().map(|p| p.month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.points.last().map(|p| p.month)
    }

    pub fn total_line_items(&self) -> u64 {
        self.points.last().map(|p| p.accum_line_items).unwrap_or(0)
    }

    pub fn total_qty(&self) -> u64 {
        self.points.last().map(|p| p.accum_qty).unwrap_or(0)
    }

    pub fn total_acq_cost(&self) -> Decimal {
        self.points
            .last()
            .map(|p| p.accum_acq_cost)
            .unwrap_or(Decimal::ZERO)
    }

    /// 指定月份的累計成本；超出曲線範圍時沿用最後一個已知值，
    /// 曲線開始之前為 0
    pub fn accum_acq_cost_at(&self, month: YearMonth) -> Decimal {
        self.points
            .iter()
            .take_while(|p| p.month <= month)
            .last()
            .map(|p| p.accum_acq_cost)
            .unwrap_or(Decimal::ZERO)
    }

    /// 有活動的月份（當月數量 > 0）
    pub fn active_months(&self) -> impl Iterator<Item = &CurvePoint> {
        self.points.iter().filter(|p| p.line_items > 0)
    }

    /// 建置完成月份：累計數量第一次達到總量的月份
    pub fn completion_month(&self) -> Option<YearMonth> {
        let total = self.total_line_items();
        if total == 0 {
            return None;
        }
        self.points
            .iter()
            .find(|p| p.accum_line_items == total)
            .map(|p| p.month)
    }
}

/// 單一情境的兩條曲線
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioCurves {
    pub scenario_id: ScenarioId,
    pub efficient: Curve,
    pub hypothetical: Curve,
}

/// 曲線聚合器
pub struct CurveAggregator;

impl CurveAggregator {
    /// 為單一情境建立效率曲線與假設性曲線（情境之間互不共用）
    pub fn aggregate(scenario: &Scenario, combinations: &[&Combination]) -> ScenarioCurves {
        ScenarioCurves {
            scenario_id: scenario.id,
            efficient: Self::build_curve(scenario, combinations, CurveKind::Efficient),
            hypothetical: Self::build_curve(scenario, combinations, CurveKind::Hypothetical),
        }
    }

    fn build_curve(scenario: &Scenario, combinations: &[&Combination], kind: CurveKind) -> Curve {
        let Some((start, end)) = BucketingCalculator::month_range(scenario, combinations, kind) else {
            return Curve::empty(kind);
        };

        let months = BucketingCalculator::create_month_buckets(start, end);
        let buckets = BucketingCalculator::bucket(combinations, kind);

        tracing::debug!(
            "{} {:?} 曲線: {} 個月, {} 個有活動的月份",
            scenario.id,
            kind,
            months.len(),
            buckets.len()
        );

        Curve::build(kind, &months, &buckets)
    }
}
