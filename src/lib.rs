//! # BUP
//!
//! 備件建置計劃（Build-Up Plan）分析：效率曲線與假設性一次採購的比較、
//! 成本規避以及批次分配。
//!
//! ```no_run
//! use bup::{AnalysisConfig, BuildUpCalculator, PartCatalog, ScenarioStore};
//!
//! let calculator = BuildUpCalculator::new(AnalysisConfig::default())?;
//! let result = calculator.recompute(&PartCatalog::default(), &ScenarioStore::new());
//! assert!(result.scenarios.is_empty());
//! # Ok::<(), bup::BupError>(())
//! ```

pub use bup_calc;
pub use bup_core;

pub use bup_calc::{
    AnalysisWarning, BatchOutcome, BuildUpCalculator, BuildUpResult, ScenarioResult,
    WarningSeverity,
};
pub use bup_core::{
    AnalysisConfig, BupError, Part, PartCatalog, PartRecord, ProcurementPipeline, Result,
    Scenario, ScenarioDraft, ScenarioForm, ScenarioId, ScenarioStore,
};
