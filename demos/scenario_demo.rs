//! BUP 情境分析示例
//!
//! 執行：`RUST_LOG=debug cargo run --example scenario_demo`

use bup::{AnalysisConfig, BuildUpCalculator, PartCatalog, PartRecord, ScenarioForm, ScenarioStore};
use bup_calc::BatchOutcome;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

fn record(pn: &str, qty: &str, leadtime: Option<&str>, acq_cost: &str) -> PartRecord {
    PartRecord {
        pn: pn.to_string(),
        ecode: "!4711".to_string(),
        qty: qty.to_string(),
        spc: "2".to_string(),
        leadtime: leadtime.map(str::to_string),
        acq_cost: acq_cost.to_string(),
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    println!("=== BUP 情境分析示例 ===\n");

    let config = AnalysisConfig::default();

    // 載入範圍（成本欄位混用逗號與句點）
    let catalog = PartCatalog::from_records(
        vec![
            record("HYD-PUMP-01", "2", Some("100"), "12500,50"),
            record("ACT-LG-220", "3", Some("150"), "8400.00"),
            record("AVN-DISP-7", "1", Some("200"), "31000"),
            record("SEAL-KIT-3", "12", None, "45,90"),
            record("OBSOLETE-1", "0", Some("90"), "999"),
        ],
        &config,
    )?;

    println!("範圍料號: {}，BUP 總價: {}", catalog.len(), catalog.list_value());

    // 第一個情境
    let mut store = ScenarioStore::new();
    let first = ScenarioForm {
        t0: "01/01/2024".to_string(),
        acft_delivery_start: "01/01/2027".to_string(),
        material_delivery_start: "38".to_string(),
        material_delivery_end: "43".to_string(),
        batches_dates: "01/12/2024, 01/03/2025".to_string(),
        ..Default::default()
    };
    store.append(first.validate()?)?;

    // 沿用上一個情境，縮短緩衝期
    if let Some(previous) = store.last() {
        let mut second = ScenarioForm::from_scenario(previous);
        second.buffer = "30".to_string();
        second.hyp_t0_start = "6".to_string();
        store.append(second.validate()?)?;
    }

    let calculator = BuildUpCalculator::new(config)?;
    let result = calculator.recompute(&catalog, &store);

    println!(
        "\n月利率: {}%，日利率: {}%",
        result.rates.monthly_pct.round_dp(4),
        result.rates.daily_pct.round_dp(6)
    );

    for scenario in &result.scenarios {
        println!("\n{} ({}):", scenario.scenario_id, scenario.color);
        println!(
            "  效率曲線完成月份: {:?}",
            scenario.curves.efficient.completion_month().map(|m| m.to_string())
        );
        println!(
            "  假設性曲線完成月份: {:?}",
            scenario.curves.hypothetical.completion_month().map(|m| m.to_string())
        );
        println!("  節省金額: {}", scenario.cost_avoidance.total_savings);

        match &scenario.batches {
            BatchOutcome::NotConfigured => println!("  批次: 未配置"),
            BatchOutcome::Assigned(report) => {
                for batch in &report.batches {
                    println!(
                        "  Batch {} ({}): {} 個料號, {}",
                        batch.index, batch.target_date, batch.part_count, batch.total_acq_cost
                    );
                }
                println!(
                    "  No Batch Assigned: {} 個料號",
                    report.unassigned.part_count
                );
            }
        }
    }

    for pct in [-20.0, 0.0, 20.0] {
        let outcome = result.sensitivity(pct);
        println!(
            "\n效率變動 {:+}% → 採購週期 {} 天，影響金額 {}",
            outcome.efficiency_change_pct,
            outcome.simulated_length_days,
            outcome.incremental_amount.round_dp(2)
        );
    }

    for warning in &result.warnings {
        println!("[{:?}] {}: {}", warning.severity, warning.scenario_id, warning.message);
    }

    println!("\n組合表:\n{}", result.combinations_json()?);

    Ok(())
}
