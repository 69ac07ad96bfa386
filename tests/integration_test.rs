//! 集成測試

use bup::bup_calc::{BatchLabel, CurvePoint, ScheduleDeriver};
use bup::bup_core::{BatchPlan, YearMonth};
use bup::{
    AnalysisConfig, BuildUpCalculator, Part, PartCatalog, PartRecord, ProcurementPipeline,
    ScenarioDraft, ScenarioForm, ScenarioStore,
};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ym(y: i32, m: u32) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

fn calculator() -> BuildUpCalculator {
    BuildUpCalculator::new(AnalysisConfig::default()).unwrap()
}

fn reference_catalog() -> PartCatalog {
    PartCatalog::new(vec![
        Part::new("PN-100".to_string(), 1, 2, 100, Decimal::from(1000)),
        Part::new("PN-150".to_string(), 2, 3, 150, Decimal::from(2000)),
        Part::new("PN-200".to_string(), 3, 1, 200, Decimal::from(3000)),
    ])
}

fn no_pipeline() -> ProcurementPipeline {
    ProcurementPipeline::new()
        .with_pr_release_approval_vss(0)
        .with_po_commercial_condition(0)
        .with_po_conversion(0)
        .with_export_license(0)
        .with_buffer(0)
        .with_outbound_logistic(0)
}

fn reference_draft() -> ScenarioDraft {
    ScenarioDraft::new(date(2024, 1, 1), date(2027, 1, 1), 38, 43)
}

#[test]
fn test_reference_scenario_dates() {
    // t0 = 2024-01-01、交貨區間 38..43 個月、預設流程 155 天
    let mut store = ScenarioStore::new();
    store.append(reference_draft()).unwrap();

    let result = calculator().recompute(&reference_catalog(), &store);

    let lengths: Vec<u32> = result
        .combinations
        .iter()
        .map(|c| c.schedule.procurement_length_days)
        .collect();
    assert_eq!(lengths, vec![255, 305, 355]);

    let first = &result.combinations[0];
    assert_eq!(first.schedule.avg_month_diff, 2);
    assert_eq!(first.schedule.avg_delivery_date, date(2027, 5, 1));
    assert_eq!(first.schedule.efficient_order_date, date(2026, 8, 19));

    for combination in &result.combinations {
        assert_eq!(combination.schedule.hypothetical_order_date, date(2024, 4, 1));
    }

    let deliveries: Vec<NaiveDate> = result
        .combinations
        .iter()
        .map(|c| c.schedule.hypothetical_delivery_date)
        .collect();
    assert_eq!(
        deliveries,
        vec![date(2024, 12, 12), date(2025, 1, 31), date(2025, 3, 22)]
    );

    // 同一下單日，三個不同的到貨月份
    let curves = &result.scenarios[0].curves;
    let spikes: Vec<(YearMonth, u64)> = curves
        .hypothetical
        .active_months()
        .map(|p| (p.month, p.qty))
        .collect();
    assert_eq!(
        spikes,
        vec![(ym(2024, 12), 2), (ym(2025, 1), 3), (ym(2025, 3), 1)]
    );
}

#[test]
fn test_reference_batches() {
    // 規劃起點 2025-01-01：t0 2024-10-01 + 3 個月
    let draft = ScenarioDraft::new(date(2024, 10, 1), date(2027, 1, 1), 38, 43)
        .with_pipeline(no_pipeline())
        .with_batch_plan(BatchPlan::new(vec![date(2025, 6, 1), date(2025, 9, 1)]));
    let mut store = ScenarioStore::new();
    store.append(draft).unwrap();

    // 流程階段皆為 0：採購週期 150 / 200 / 400 天
    let catalog = PartCatalog::new(vec![
        Part::new("FITS-1".to_string(), 1, 1, 150, Decimal::ONE),
        Part::new("FITS-2".to_string(), 2, 1, 200, Decimal::ONE),
        Part::new("TOO-LONG".to_string(), 3, 1, 400, Decimal::ONE),
    ]);

    let result = calculator().recompute(&catalog, &store);
    let report = result.scenarios[0].batches.report().unwrap();

    let lengths: Vec<u32> = report
        .assignments
        .iter()
        .map(|a| a.procurement_length_days)
        .collect();
    assert_eq!(lengths, vec![150, 200, 400]);
    assert_eq!(report.batches[0].available_days, 151);
    assert_eq!(report.batches[1].available_days, 243);
    assert_eq!(report.label_of("FITS-1"), Some(BatchLabel::Batch(1)));
    assert_eq!(report.label_of("FITS-2"), Some(BatchLabel::Batch(2)));
    assert_eq!(report.label_of("TOO-LONG"), Some(BatchLabel::Unassigned));
    assert_eq!(
        report.label_of("TOO-LONG").unwrap().to_string(),
        "No Batch Assigned"
    );
}

#[test]
fn test_empty_catalog_degrades_to_zero() {
    let mut store = ScenarioStore::new();
    store
        .append(reference_draft().with_batch_plan(BatchPlan::new(vec![date(2025, 1, 1)])))
        .unwrap();

    let result = calculator().recompute(&PartCatalog::default(), &store);
    let scenario = &result.scenarios[0];

    assert!(scenario.curves.efficient.is_empty());
    assert!(scenario.curves.hypothetical.is_empty());
    assert_eq!(scenario.cost_avoidance.total_savings, Decimal::ZERO);
    assert_eq!(result.bup_cost, Decimal::ZERO);
    assert_eq!(result.sensitivity(10.0).incremental_amount, Decimal::ZERO);

    // 已配置批次但沒有料號，仍與未配置區分
    let report = scenario.batches.report().unwrap();
    assert_eq!(report.batches.len(), 1);
    assert_eq!(report.batches[0].part_count, 0);
}

#[test]
fn test_recompute_after_each_scenario() {
    let calculator = calculator();
    let catalog = reference_catalog();
    let mut store = ScenarioStore::new();

    let first_id = store.append(reference_draft()).unwrap();
    let first = calculator.recompute(&catalog, &store);

    let second_id = store
        .append(reference_draft().with_hyp_t0_start(12))
        .unwrap();
    let second = calculator.recompute(&catalog, &store);

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.scenarios.len(), 1);
    assert_eq!(second.scenarios.len(), 2);

    // 舊情境的結果在重算後不變
    let before = first.scenario(first_id).unwrap();
    let after = second.scenario(first_id).unwrap();
    assert_eq!(before.curves, after.curves);
    assert_eq!(before.cost_avoidance, after.cost_avoidance);

    // 越晚一次採購，延後的資金越多
    let later = second.scenario(second_id).unwrap();
    assert_eq!(later.color, "orange");
    assert!(later.cost_avoidance.total_savings < before.cost_avoidance.total_savings);
}

#[test]
fn test_form_to_result() {
    let config = AnalysisConfig::default();
    let records = vec![
        PartRecord {
            pn: "PN-A".to_string(),
            ecode: "!123".to_string(),
            qty: "2".to_string(),
            spc: "2".to_string(),
            leadtime: Some("100".to_string()),
            acq_cost: "1000,50".to_string(),
            ..Default::default()
        },
        PartRecord {
            pn: "PN-B".to_string(),
            qty: "1".to_string(),
            acq_cost: "99.50".to_string(),
            ..Default::default()
        },
        PartRecord {
            pn: "PN-ZERO".to_string(),
            qty: "0".to_string(),
            acq_cost: "1".to_string(),
            ..Default::default()
        },
    ];
    let catalog = PartCatalog::from_records(records, &config).unwrap();
    assert_eq!(catalog.len(), 2);
    // 查無提前期時使用預設 127 天
    assert_eq!(catalog.parts()[0].leadtime_days, 127);

    let form = ScenarioForm {
        t0: "01/01/2024".to_string(),
        acft_delivery_start: "01/01/2027".to_string(),
        material_delivery_start: "38".to_string(),
        material_delivery_end: "43".to_string(),
        ..Default::default()
    };
    let mut store = ScenarioStore::new();
    store.append(form.validate().unwrap()).unwrap();

    let result = BuildUpCalculator::new(config)
        .unwrap()
        .recompute(&catalog, &store);

    assert_eq!(result.bup_cost, Decimal::new(210050, 2));
    assert!(result.scenarios[0].cost_avoidance.total_savings > Decimal::ZERO);
    assert!(!result.scenarios[0].batches.is_configured());

    let exported: serde_json::Value =
        serde_json::from_str(&result.combinations_json().unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 2);
    assert_eq!(exported[0]["pn"], "PN-B");
}

#[test]
fn test_invalid_form_names_field() {
    let form = ScenarioForm {
        t0: "2024-01-01".to_string(),
        acft_delivery_start: "01/01/2027".to_string(),
        material_delivery_start: "38".to_string(),
        material_delivery_end: "43".to_string(),
        ..Default::default()
    };

    let err = form.validate().unwrap_err();
    assert_eq!(err.field(), Some("t0"));
}

fn is_monotonic(points: &[CurvePoint]) -> bool {
    points.windows(2).all(|w| {
        w[1].accum_qty >= w[0].accum_qty
            && w[1].accum_acq_cost >= w[0].accum_acq_cost
            && w[1].accum_line_items >= w[0].accum_line_items
    })
}

prop_compose! {
    fn arb_part()(
        qty in 1u32..50,
        leadtime in 0u32..700,
        cents in 1i64..10_000_000,
    ) -> (u32, u32, Decimal) {
        (qty, leadtime, Decimal::new(cents, 2))
    }
}

prop_compose! {
    fn arb_catalog()(parts in prop::collection::vec(arb_part(), 1..30)) -> PartCatalog {
        parts
            .into_iter()
            .enumerate()
            .map(|(i, (qty, leadtime, cost))| {
                Part::new(format!("PN-{i}"), i as i64, qty, leadtime, cost)
            })
            .collect()
    }
}

prop_compose! {
    fn arb_pipeline()(stages in prop::array::uniform6(0u32..120)) -> ProcurementPipeline {
        ProcurementPipeline::new()
            .with_pr_release_approval_vss(stages[0])
            .with_po_commercial_condition(stages[1])
            .with_po_conversion(stages[2])
            .with_export_license(stages[3])
            .with_buffer(stages[4])
            .with_outbound_logistic(stages[5])
    }
}

prop_compose! {
    fn arb_draft()(
        year in 2015i32..2035,
        month in 1u32..=12,
        start in 0u32..72,
        span in 0u32..24,
        hyp in 0u32..36,
        pipeline in arb_pipeline(),
        batch_offsets in prop::collection::vec(0u64..1500, 0..5),
    ) -> ScenarioDraft {
        let t0 = date(year, month, 1);
        let planning_start = t0.checked_add_months(chrono::Months::new(hyp)).unwrap();
        let dates = batch_offsets
            .into_iter()
            .map(|d| planning_start.checked_add_days(Days::new(d)).unwrap())
            .collect();

        ScenarioDraft::new(t0, t0, start, start + span)
            .with_hyp_t0_start(hyp)
            .with_pipeline(pipeline)
            .with_batch_plan(BatchPlan::new(dates))
    }
}

proptest! {
    #[test]
    fn prop_procurement_length_is_additive(catalog in arb_catalog(), draft in arb_draft()) {
        let pipeline = draft.pipeline;
        let mut store = ScenarioStore::new();
        store.append(draft).unwrap();
        let scenario = store.last().unwrap();

        for part in catalog.iter() {
            let expected = part.leadtime_days
                + pipeline.pr_release_approval_vss
                + pipeline.po_commercial_condition
                + pipeline.po_conversion
                + pipeline.export_license
                + pipeline.buffer
                + pipeline.outbound_logistic;
            prop_assert_eq!(ScheduleDeriver::procurement_length_days(part, scenario), expected);
        }
    }

    #[test]
    fn prop_curves_accumulate_and_conserve(catalog in arb_catalog(), draft in arb_draft()) {
        let mut store = ScenarioStore::new();
        store.append(draft).unwrap();
        let result = calculator().recompute(&catalog, &store);
        let curves = &result.scenarios[0].curves;

        for curve in [&curves.efficient, &curves.hypothetical] {
            prop_assert!(is_monotonic(&curve.points));
            prop_assert_eq!(curve.total_qty(), catalog.total_qty());
            prop_assert_eq!(curve.total_acq_cost(), catalog.list_value());
            prop_assert_eq!(curve.total_line_items(), catalog.len() as u64);

            let months: Vec<YearMonth> = curve.points.iter().map(|p| p.month).collect();
            prop_assert!(months.windows(2).all(|w| w[0].succ() == w[1]));
        }
    }

    #[test]
    fn prop_single_length_gives_single_step(
        qtys in prop::collection::vec(1u32..50, 1..20),
        leadtime in 0u32..700,
        draft in arb_draft(),
    ) {
        let catalog: PartCatalog = qtys
            .iter()
            .enumerate()
            .map(|(i, &qty)| Part::new(format!("PN-{i}"), i as i64, qty, leadtime, Decimal::ONE))
            .collect();
        let mut store = ScenarioStore::new();
        store.append(draft).unwrap();
        let result = calculator().recompute(&catalog, &store);

        let active: Vec<&CurvePoint> = result.scenarios[0].curves.hypothetical.active_months().collect();
        prop_assert_eq!(active.len(), 1);
        prop_assert_eq!(active[0].qty, catalog.total_qty());
    }

    #[test]
    fn prop_every_part_gets_one_label(catalog in arb_catalog(), draft in arb_draft()) {
        let mut store = ScenarioStore::new();
        store.append(draft).unwrap();
        let result = calculator().recompute(&catalog, &store);

        if let Some(report) = result.scenarios[0].batches.report() {
            prop_assert_eq!(report.assignments.len(), catalog.len());
            prop_assert_eq!(
                report.assigned_count() + report.unassigned.part_count,
                catalog.len()
            );
        }
    }

    #[test]
    fn prop_savings_non_negative_in_normal_case(catalog in arb_catalog(), draft in arb_draft()) {
        let mut store = ScenarioStore::new();
        store.append(draft).unwrap();
        let result = calculator().recompute(&catalog, &store);
        let cost_avoidance = &result.scenarios[0].cost_avoidance;

        // bup_cost 為範圍總價，效率曲線累計支出不會超過它
        for row in &cost_avoidance.rows {
            prop_assert!(row.accum_acq_cost_eff <= result.bup_cost);
            prop_assert!(row.postponed_savings >= Decimal::ZERO);
        }
        prop_assert!(cost_avoidance.total_savings >= Decimal::ZERO);
        prop_assert!(!cost_avoidance.has_negative_postponement());
    }

    #[test]
    fn prop_sensitivity_stays_in_range(pct in -200.0f64..200.0) {
        let result = calculator().recompute(&reference_catalog(), &ScenarioStore::new());
        let outcome = result.sensitivity(pct);

        prop_assert!((-50.0..=50.0).contains(&outcome.efficiency_change_pct));
        prop_assert!(outcome.simulated_length_days >= 177);
        prop_assert!(outcome.simulated_length_days <= 533);
    }
}
