//! 月份分桶

use bup_core::{Scenario, YearMonth};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::schedule::Combination;

/// 曲線類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CurveKind {
    /// 效率曲線：依效率下單日分桶
    Efficient,
    /// 假設性曲線：依假設性到貨日分桶
    Hypothetical,
}

impl CurveKind {
    /// 該曲線用於分桶的日期
    pub fn event_date(self, combination: &Combination) -> NaiveDate {
        match self {
            CurveKind::Efficient => combination.schedule.efficient_order_date,
            CurveKind::Hypothetical => combination.schedule.hypothetical_delivery_date,
        }
    }
}

/// 單月彙總
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthBucket {
    /// 組合筆數（料號行數）
    pub line_items: u64,
    /// Σ 數量
    pub qty: u64,
    /// Σ 數量 × 單位成本
    pub acq_cost: Decimal,
}

impl MonthBucket {
    fn add(&mut self, combination: &Combination) {
        self.line_items += 1;
        self.qty += u64::from(combination.part.qty);
        self.acq_cost += combination.total_acq_cost();
    }
}

/// 月份分桶計算器
pub struct BucketingCalculator;

impl BucketingCalculator {
    /// 曲線的月份範圍
    ///
    /// 取 t0、飛機交付起始日、合約交貨區間起訖日以及各組合事件日的最小、
    /// 最大值，前後各擴一個月。沒有任何組合時返回 None。
    pub fn month_range(
        scenario: &Scenario,
        combinations: &[&Combination],
        kind: CurveKind,
    ) -> Option<(YearMonth, YearMonth)> {
        if combinations.is_empty() {
            return None;
        }

        let anchors = [
            scenario.t0,
            scenario.acft_delivery_start,
            scenario.material_delivery_start_date(),
            scenario.material_delivery_end_date(),
        ];

        let dates = anchors
            .into_iter()
            .chain(combinations.iter().map(|c| kind.event_date(c)));

        let (min, max) = dates.fold((NaiveDate::MAX, NaiveDate::MIN), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });

        Some((YearMonth::of(min).pred(), YearMonth::of(max).succ()))
    }

    /// 創建連續的月份桶（含首尾）
    pub fn create_month_buckets(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
        YearMonth::range_inclusive(start, end)
    }

    /// 依事件日所在月份彙總
    pub fn bucket(combinations: &[&Combination], kind: CurveKind) -> BTreeMap<YearMonth, MonthBucket> {
        let mut buckets: BTreeMap<YearMonth, MonthBucket> = BTreeMap::new();

        for combination in combinations {
            buckets
                .entry(YearMonth::of(kind.event_date(combination)))
                .or_default()
                .add(combination);
        }

        buckets
    }
}
