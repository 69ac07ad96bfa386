//! 批次分配
//!
//! 依批次目標日由早到晚掃描，每個料號落入第一個來得及的批次。
//! 不做最佳化，同分時以批次順序決定。

use bup_core::{calendar, Scenario, ScenarioId, YearMonth};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::schedule::Combination;

/// 料號的批次標籤
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BatchLabel {
    /// 第 N 批（從 1 起算）
    Batch(u32),
    /// 沒有任何批次來得及
    Unassigned,
}

impl BatchLabel {
    pub fn is_assigned(&self) -> bool {
        matches!(self, BatchLabel::Batch(_))
    }
}

impl fmt::Display for BatchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchLabel::Batch(index) => write!(f, "Batch {}", index),
            BatchLabel::Unassigned => write!(f, "No Batch Assigned"),
        }
    }
}

/// 單一料號的分配結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartAssignment {
    pub pn: String,
    pub procurement_length_days: u32,
    pub total_acq_cost: Decimal,
    pub label: BatchLabel,
}

/// 批次彙總
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub index: u32,
    /// 視窗起點：前一批目標日，第一批為規劃起點
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    /// 規劃起點到目標日的天數
    pub available_days: i64,
    /// 組合筆數
    pub part_count: usize,
    /// 不重複料號數
    pub distinct_part_count: usize,
    pub total_acq_cost: Decimal,
}

/// 未分配料號的彙總
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnassignedBucket {
    pub part_count: usize,
    pub distinct_part_count: usize,
    pub total_acq_cost: Decimal,
}

/// 依假設性到貨月份彙總的交貨分佈
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryMonth {
    pub month: YearMonth,
    pub distinct_pns: usize,
    pub accum_distinct_pns: usize,
    pub acq_cost: Decimal,
    pub accum_acq_cost: Decimal,
}

/// 已配置批次時的完整結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub scenario_id: ScenarioId,
    pub planning_start_date: NaiveDate,
    pub assignments: Vec<PartAssignment>,
    pub batches: Vec<BatchSummary>,
    pub unassigned: UnassignedBucket,
    pub delivery_profile: Vec<DeliveryMonth>,
}

impl BatchReport {
    pub fn assigned_count(&self) -> usize {
        self.batches.iter().map(|b| b.part_count).sum()
    }

    pub fn label_of(&self, pn: &str) -> Option<BatchLabel> {
        self.assignments
            .iter()
            .find(|a| a.pn == pn)
            .map(|a| a.label)
    }
}

/// 批次分配結果：未配置與「配置了但沒有料號分到」是兩種不同狀態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchOutcome {
    NotConfigured,
    Assigned(BatchReport),
}

impl BatchOutcome {
    pub fn is_configured(&self) -> bool {
        matches!(self, BatchOutcome::Assigned(_))
    }

    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            BatchOutcome::NotConfigured => None,
            BatchOutcome::Assigned(report) => Some(report),
        }
    }
}

/// 批次分配器
pub struct BatchAssigner;

impl BatchAssigner {
    /// 找出第一個可用天數足夠的批次
    pub fn assign_label(
        procurement_length_days: u32,
        planning_start: NaiveDate,
        sorted_dates: &[NaiveDate],
    ) -> BatchLabel {
        sorted_dates
            .iter()
            .position(|&target| {
                i64::from(procurement_length_days) <= calendar::days_between(planning_start, target)
            })
            .map(|i| BatchLabel::Batch(i as u32 + 1))
            .unwrap_or(BatchLabel::Unassigned)
    }

    /// 為單一情境的組合分配批次
    pub fn assign(scenario: &Scenario, combinations: &[&Combination]) -> BatchOutcome {
        let Some(plan) = scenario.batch_plan.as_ref().filter(|p| p.is_configured()) else {
            return BatchOutcome::NotConfigured;
        };

        let dates = plan.sorted_dates();
        let planning_start = scenario.planning_start_date();

        let assignments: Vec<PartAssignment> = combinations
            .iter()
            .map(|c| PartAssignment {
                pn: c.part.pn.clone(),
                procurement_length_days: c.schedule.procurement_length_days,
                total_acq_cost: c.total_acq_cost(),
                label: Self::assign_label(c.schedule.procurement_length_days, planning_start, &dates),
            })
            .collect();

        let mut batches: Vec<BatchSummary> = dates
            .iter()
            .enumerate()
            .map(|(i, &target_date)| BatchSummary {
                index: i as u32 + 1,
                start_date: if i == 0 { planning_start } else { dates[i - 1] },
                target_date,
                available_days: calendar::days_between(planning_start, target_date),
                part_count: 0,
                distinct_part_count: 0,
                total_acq_cost: Decimal::ZERO,
            })
            .collect();
        let mut unassigned = UnassignedBucket::default();

        {
            let mut batch_pns: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); batches.len()];
            let mut unassigned_pns: BTreeSet<&str> = BTreeSet::new();

            for assignment in &assignments {
                match assignment.label {
                    BatchLabel::Batch(index) => {
                        let slot = index as usize - 1;
                        if let (Some(batch), Some(pns)) =
                            (batches.get_mut(slot), batch_pns.get_mut(slot))
                        {
                            batch.part_count += 1;
                            batch.total_acq_cost += assignment.total_acq_cost;
                            pns.insert(assignment.pn.as_str());
                        }
                    }
                    BatchLabel::Unassigned => {
                        unassigned.part_count += 1;
                        unassigned.total_acq_cost += assignment.total_acq_cost;
                        unassigned_pns.insert(assignment.pn.as_str());
                    }
                }
            }

            for (batch, pns) in batches.iter_mut().zip(&batch_pns) {
                batch.distinct_part_count = pns.len();
            }
            unassigned.distinct_part_count = unassigned_pns.len();
        }

        tracing::debug!(
            "{} 批次分配: {} 批, {} 個料號, 未分配 {}",
            scenario.id,
            batches.len(),
            assignments.len(),
            unassigned.part_count
        );

        BatchOutcome::Assigned(BatchReport {
            scenario_id: scenario.id,
            planning_start_date: planning_start,
            assignments,
            batches,
            unassigned,
            delivery_profile: Self::delivery_profile(combinations),
        })
    }

    /// 依假設性到貨月份彙總料號數與取得成本
    pub fn delivery_profile(combinations: &[&Combination]) -> Vec<DeliveryMonth> {
        let mut months: BTreeMap<YearMonth, (BTreeSet<&str>, Decimal)> = BTreeMap::new();

        for c in combinations {
            let entry = months
                .entry(YearMonth::of(c.schedule.hypothetical_delivery_date))
                .or_default();
            entry.0.insert(c.part.pn.as_str());
            entry.1 += c.total_acq_cost().round_dp(2);
        }

        let mut accum_pns = 0;
        let mut accum_cost = Decimal::ZERO;

        months
            .into_iter()
            .map(|(month, (pns, acq_cost))| {
                accum_pns += pns.len();
                accum_cost += acq_cost;
                DeliveryMonth {
                    month,
                    distinct_pns: pns.len(),
                    accum_distinct_pns: accum_pns,
                    acq_cost,
                    accum_acq_cost: accum_cost,
                }
            })
            .collect()
    }
}
