//! BUP 主計算器

use bup_core::{AnalysisConfig, PartCatalog, Scenario, ScenarioStore};

use crate::batching::{BatchAssigner, BatchOutcome};
use crate::cost_avoidance::{CostAvoidanceCalculator, DiscountRates};
use crate::curves::CurveAggregator;
use crate::schedule::{Combination, ScheduleDeriver};
use crate::stats::LeadtimeStats;
use crate::{AnalysisWarning, BuildUpResult, ScenarioResult};

/// BUP 計算器
///
/// 每次新增情境後對整個情境庫全部重算，不保留任何中間狀態。
pub struct BuildUpCalculator {
    /// 分析配置
    config: AnalysisConfig,

    /// 由 WACC 換算的折現率
    rates: DiscountRates,
}

impl BuildUpCalculator {
    /// 創建新的計算器（驗證配置並預先換算折現率）
    pub fn new(config: AnalysisConfig) -> bup_core::Result<Self> {
        config.validate()?;
        let rates = DiscountRates::from_annual_pct(config.wacc_pct)?;

        Ok(Self { config, rates })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn rates(&self) -> &DiscountRates {
        &self.rates
    }

    /// 主計算入口：對所有情境全部重算
    pub fn recompute(&self, catalog: &PartCatalog, store: &ScenarioStore) -> BuildUpResult {
        tracing::info!(
            "開始 BUP 計算：料號 {} 筆，情境 {} 個",
            catalog.len(),
            store.len()
        );

        let start_time = std::time::Instant::now();
        let mut result = BuildUpResult::empty(&self.rates, self.config.sensitivity_baseline_days);

        // Step 1: 範圍總價（與情境無關）
        tracing::debug!("Step 1: 範圍總價");
        result.bup_cost = catalog.list_value();
        result.leadtime_stats = LeadtimeStats::from_catalog(catalog);
        tracing::debug!("BUP 總價: {}", result.bup_cost);

        // Step 2: 料號 × 情境組合
        tracing::debug!("Step 2: 推導排程");
        result.combinations = ScheduleDeriver::combine(catalog, store);
        tracing::debug!("組合數量: {}", result.combinations.len());

        // Step 3: 逐情境計算曲線、成本規避與批次
        tracing::debug!("Step 3: 逐情境計算");
        for scenario in store.iter() {
            let scoped: Vec<&Combination> = result
                .combinations
                .iter()
                .filter(|c| c.scenario_id() == scenario.id)
                .collect();

            let (scenario_result, warnings) = self.calculate_scenario(scenario, &scoped, &result);
            result.scenarios.push(scenario_result);
            for warning in warnings {
                result.add_warning(warning);
            }
        }

        let elapsed = start_time.elapsed();
        result.calculation_time_ms = Some(elapsed.as_millis());

        tracing::info!(
            "BUP 計算完成：{} 個情境，{} 筆組合，耗時 {:?}",
            result.scenarios.len(),
            result.combinations.len(),
            elapsed
        );

        result
    }

    /// 計算單一情境
    fn calculate_scenario(
        &self,
        scenario: &Scenario,
        combinations: &[&Combination],
        result: &BuildUpResult,
    ) -> (ScenarioResult, Vec<AnalysisWarning>) {
        tracing::debug!("計算情境: {}", scenario.id);
        let mut warnings = Vec::new();

        let curves = CurveAggregator::aggregate(scenario, combinations);
        let cost_avoidance =
            CostAvoidanceCalculator::calculate(scenario, &curves, result.bup_cost, &self.rates);

        if cost_avoidance.has_negative_postponement() {
            warnings.push(AnalysisWarning::warning(
                scenario.id,
                format!(
                    "效率曲線累計支出超過一次採購金額 {}，部分月份的延後資金為負值",
                    result.bup_cost
                ),
            ));
        }

        let batches = BatchAssigner::assign(scenario, combinations);
        if let BatchOutcome::Assigned(report) = &batches {
            if report.unassigned.part_count > 0 {
                warnings.push(AnalysisWarning::info(
                    scenario.id,
                    format!(
                        "{} 個料號沒有可用的批次（No Batch Assigned）",
                        report.unassigned.part_count
                    ),
                ));
            }
        }

        tracing::debug!(
            "{} 節省金額: {}",
            scenario.id,
            cost_avoidance.total_savings
        );

        let scenario_result = ScenarioResult {
            scenario_id: scenario.id,
            color: scenario.id.color(),
            curves,
            cost_avoidance,
            batches,
        };

        (scenario_result, warnings)
    }
}
