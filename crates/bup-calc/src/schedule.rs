//! 排程推導
//!
//! 對每個（備件 × 情境）組合計算採購週期與兩條曲線所需的日期。

use bup_core::calendar;
use bup_core::{Part, PartCatalog, Scenario, ScenarioId, ScenarioStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// 單一組合的推導結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartSchedule {
    /// 交貨區間中點月數差
    pub avg_month_diff: u32,
    /// 平均交貨日
    pub avg_delivery_date: NaiveDate,
    pub material_delivery_start_date: NaiveDate,
    pub material_delivery_end_date: NaiveDate,
    /// 料號採購週期（天）= 提前期 + 各流程階段
    pub procurement_length_days: u32,
    /// 效率曲線下單日
    pub efficient_order_date: NaiveDate,
    /// 假設性一次採購下單日
    pub hypothetical_order_date: NaiveDate,
    /// 假設性曲線到貨日
    pub hypothetical_delivery_date: NaiveDate,
}

/// 備件與情境的組合（所有聚合都基於這張表）
#[derive(Debug, Clone, Serialize)]
pub struct Combination {
    #[serde(flatten)]
    pub part: Part,
    #[serde(flatten)]
    pub scenario: Scenario,
    #[serde(flatten)]
    pub schedule: PartSchedule,
}

impl Combination {
    pub fn scenario_id(&self) -> ScenarioId {
        self.scenario.id
    }

    /// 該行總取得成本
    pub fn total_acq_cost(&self) -> Decimal {
        self.part.total_acq_cost()
    }
}

/// 排程推導器
pub struct ScheduleDeriver;

impl ScheduleDeriver {
    /// 料號採購週期（天）
    pub fn procurement_length_days(part: &Part, scenario: &Scenario) -> u32 {
        part.leadtime_days
            .saturating_add(scenario.pipeline.total_days())
    }

    /// 計算下單日（由需求日往前推採購週期）
    pub fn calculate_order_date(required_date: NaiveDate, procurement_length_days: u32) -> NaiveDate {
        calendar::sub_days(required_date, procurement_length_days)
    }

    /// 計算到貨日（由下單日往後推採購週期）
    pub fn calculate_delivery_date(order_date: NaiveDate, procurement_length_days: u32) -> NaiveDate {
        calendar::add_days(order_date, procurement_length_days)
    }

    /// 推導單一組合的所有日期
    pub fn derive(part: &Part, scenario: &Scenario) -> PartSchedule {
        let procurement_length_days = Self::procurement_length_days(part, scenario);
        let avg_delivery_date = scenario.avg_delivery_date();
        let hypothetical_order_date = scenario.hypothetical_order_date();

        PartSchedule {
            avg_month_diff: scenario.avg_month_diff(),
            avg_delivery_date,
            material_delivery_start_date: scenario.material_delivery_start_date(),
            material_delivery_end_date: scenario.material_delivery_end_date(),
            procurement_length_days,
            efficient_order_date: Self::calculate_order_date(
                avg_delivery_date,
                procurement_length_days,
            ),
            hypothetical_order_date,
            hypothetical_delivery_date: Self::calculate_delivery_date(
                hypothetical_order_date,
                procurement_length_days,
            ),
        }
    }

    /// 建立所有組合：依情境順序，每個情境內依範圍順序
    pub fn combine(catalog: &PartCatalog, store: &ScenarioStore) -> Vec<Combination> {
        let mut combinations = Vec::with_capacity(catalog.len() * store.len());

        for scenario in store.iter() {
            for part in catalog.iter() {
                combinations.push(Combination {
                    part: part.clone(),
                    scenario: scenario.clone(),
                    schedule: Self::derive(part, scenario),
                });
            }
        }

        combinations
    }
}
