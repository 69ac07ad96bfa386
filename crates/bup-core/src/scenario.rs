//! 合約情境模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar;
use crate::{BupError, Result};

/// 情境配色（依 id 循環使用）
pub const SCENARIO_PALETTE: [&str; 5] = ["blue", "orange", "black", "green", "purple"];

/// 情境 ID（由情境庫單調遞增配發，不會重複使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(u32);

impl ScenarioId {
    pub fn value(self) -> u32 {
        self.0
    }

    /// 情境顏色，只由 id 決定
    pub fn color(self) -> &'static str {
        SCENARIO_PALETTE[self.0 as usize % SCENARIO_PALETTE.len()]
    }

    /// 圖例標籤
    pub fn label(self) -> String {
        format!("Scen. {}", self.0)
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scenario {}", self.0)
    }
}

/// 採購流程各階段天數（不含物料本身的提前期）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcurementPipeline {
    /// PR 發放與核准
    pub pr_release_approval_vss: u32,
    /// PO 商務條件
    pub po_commercial_condition: u32,
    /// PO 轉換
    pub po_conversion: u32,
    /// 出口許可
    pub export_license: u32,
    /// 緩衝
    pub buffer: u32,
    /// 出貨物流
    pub outbound_logistic: u32,
}

impl ProcurementPipeline {
    pub const DEFAULT_PR_RELEASE_APPROVAL_VSS: u32 = 5;
    pub const DEFAULT_PO_COMMERCIAL_CONDITION: u32 = 30;
    pub const DEFAULT_PO_CONVERSION: u32 = 30;
    pub const DEFAULT_EXPORT_LICENSE: u32 = 0;
    pub const DEFAULT_BUFFER: u32 = 60;
    pub const DEFAULT_OUTBOUND_LOGISTIC: u32 = 30;

    /// 創建預設流程（合計 155 天）
    pub fn new() -> Self {
        Self {
            pr_release_approval_vss: Self::DEFAULT_PR_RELEASE_APPROVAL_VSS,
            po_commercial_condition: Self::DEFAULT_PO_COMMERCIAL_CONDITION,
            po_conversion: Self::DEFAULT_PO_CONVERSION,
            export_license: Self::DEFAULT_EXPORT_LICENSE,
            buffer: Self::DEFAULT_BUFFER,
            outbound_logistic: Self::DEFAULT_OUTBOUND_LOGISTIC,
        }
    }

    /// 建構器模式：設置 PR 發放與核准天數
    pub fn with_pr_release_approval_vss(mut self, days: u32) -> Self {
        self.pr_release_approval_vss = days;
        self
    }

    /// 建構器模式：設置 PO 商務條件天數
    pub fn with_po_commercial_condition(mut self, days: u32) -> Self {
        self.po_commercial_condition = days;
        self
    }

    /// 建構器模式：設置 PO 轉換天數
    pub fn with_po_conversion(mut self, days: u32) -> Self {
        self.po_conversion = days;
        self
    }

    /// 建構器模式：設置出口許可天數
    pub fn with_export_license(mut self, days: u32) -> Self {
        self.export_license = days;
        self
    }

    /// 建構器模式：設置緩衝天數
    pub fn with_buffer(mut self, days: u32) -> Self {
        self.buffer = days;
        self
    }

    /// 建構器模式：設置出貨物流天數
    pub fn with_outbound_logistic(mut self, days: u32) -> Self {
        self.outbound_logistic = days;
        self
    }

    /// 各階段合計天數
    pub fn total_days(&self) -> u32 {
        self.pr_release_approval_vss
            .saturating_add(self.po_commercial_condition)
            .saturating_add(self.po_conversion)
            .saturating_add(self.export_license)
            .saturating_add(self.buffer)
            .saturating_add(self.outbound_logistic)
    }
}

impl Default for ProcurementPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// 批次配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchPlan {
    /// 操作員輸入的批次數（僅供參考，實際以日期清單為準）
    pub batches_qty: Option<u32>,

    /// 批次目標日期（輸入順序）
    pub dates: Vec<NaiveDate>,
}

impl BatchPlan {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            batches_qty: None,
            dates,
        }
    }

    /// 建構器模式：設置批次數
    pub fn with_batches_qty(mut self, qty: u32) -> Self {
        self.batches_qty = Some(qty);
        self
    }

    /// 是否有可用的批次日期
    pub fn is_configured(&self) -> bool {
        !self.dates.is_empty()
    }

    /// 由早到晚排序的批次日期
    pub fn sorted_dates(&self) -> Vec<NaiveDate> {
        let mut dates = self.dates.clone();
        dates.sort();
        dates
    }
}

/// 尚未加入情境庫的情境（尚無 id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDraft {
    pub t0: NaiveDate,
    pub hyp_t0_start: u32,
    pub acft_delivery_start: NaiveDate,
    pub material_delivery_start: u32,
    pub material_delivery_end: u32,
    pub pipeline: ProcurementPipeline,
    pub batch_plan: Option<BatchPlan>,
}

impl ScenarioDraft {
    /// 假設性採購起點的預設值（t0 之後月數）
    pub const DEFAULT_HYP_T0_START: u32 = 3;

    /// 創建新的情境草稿
    pub fn new(
        t0: NaiveDate,
        acft_delivery_start: NaiveDate,
        material_delivery_start: u32,
        material_delivery_end: u32,
    ) -> Self {
        Self {
            t0,
            hyp_t0_start: Self::DEFAULT_HYP_T0_START,
            acft_delivery_start,
            material_delivery_start,
            material_delivery_end,
            pipeline: ProcurementPipeline::default(),
            batch_plan: None,
        }
    }

    /// 建構器模式：設置假設性採購起點
    pub fn with_hyp_t0_start(mut self, months: u32) -> Self {
        self.hyp_t0_start = months;
        self
    }

    /// 建構器模式：設置採購流程
    pub fn with_pipeline(mut self, pipeline: ProcurementPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// 建構器模式：設置批次配置
    pub fn with_batch_plan(mut self, plan: BatchPlan) -> Self {
        self.batch_plan = Some(plan);
        self
    }

    /// 檢查情境整體是否有效
    pub fn validate(&self) -> Result<()> {
        if self.material_delivery_end < self.material_delivery_start {
            return Err(BupError::InvalidDeliveryWindow {
                start: self.material_delivery_start,
                end: self.material_delivery_end,
            });
        }
        Ok(())
    }
}

/// 已加入情境庫的情境（不可變）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub t0: NaiveDate,
    pub hyp_t0_start: u32,
    pub acft_delivery_start: NaiveDate,
    pub material_delivery_start: u32,
    pub material_delivery_end: u32,
    pub pipeline: ProcurementPipeline,
    pub batch_plan: Option<BatchPlan>,
}

impl Scenario {
    fn from_draft(id: ScenarioId, draft: ScenarioDraft) -> Self {
        Self {
            id,
            t0: draft.t0,
            hyp_t0_start: draft.hyp_t0_start,
            acft_delivery_start: draft.acft_delivery_start,
            material_delivery_start: draft.material_delivery_start,
            material_delivery_end: draft.material_delivery_end,
            pipeline: draft.pipeline,
            batch_plan: draft.batch_plan,
        }
    }

    /// 交貨區間中點的月數差：floor((end - start) / 2)
    pub fn avg_month_diff(&self) -> u32 {
        self.material_delivery_end
            .saturating_sub(self.material_delivery_start)
            / 2
    }

    /// 合約交貨區間開始日
    pub fn material_delivery_start_date(&self) -> NaiveDate {
        calendar::add_months(self.t0, self.material_delivery_start)
    }

    /// 合約交貨區間結束日
    pub fn material_delivery_end_date(&self) -> NaiveDate {
        calendar::add_months(self.t0, self.material_delivery_end)
    }

    /// 平均交貨日（先加開始月數，再加中點月數差）
    pub fn avg_delivery_date(&self) -> NaiveDate {
        calendar::add_months(self.material_delivery_start_date(), self.avg_month_diff())
    }

    /// 假設性一次採購的下單日（t0 + hyp_t0_start 個月）
    pub fn hypothetical_order_date(&self) -> NaiveDate {
        calendar::add_months(self.t0, self.hyp_t0_start)
    }

    /// 批次規劃起點，與假設性下單日相同
    pub fn planning_start_date(&self) -> NaiveDate {
        self.hypothetical_order_date()
    }

    /// 是否配置了批次
    pub fn has_batches(&self) -> bool {
        self.batch_plan
            .as_ref()
            .map(BatchPlan::is_configured)
            .unwrap_or(false)
    }

    /// 轉回草稿（供「沿用上一個情境」使用）
    pub fn to_draft(&self) -> ScenarioDraft {
        ScenarioDraft {
            t0: self.t0,
            hyp_t0_start: self.hyp_t0_start,
            acft_delivery_start: self.acft_delivery_start,
            material_delivery_start: self.material_delivery_start,
            material_delivery_end: self.material_delivery_end,
            pipeline: self.pipeline,
            batch_plan: self.batch_plan.clone(),
        }
    }
}

/// 情境庫：只能追加，id 單調遞增
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
    next_id: u32,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 驗證並追加情境，返回配發的 id
    pub fn append(&mut self, draft: ScenarioDraft) -> Result<ScenarioId> {
        draft.validate()?;

        let id = ScenarioId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| BupError::Other("情境 id 已用盡".to_string()))?;
        self.scenarios.push(Scenario::from_draft(id, draft));

        Ok(id)
    }

    pub fn get(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// 取得情境，不存在時返回錯誤
    pub fn require(&self, id: ScenarioId) -> Result<&Scenario> {
        self.get(id).ok_or(BupError::ScenarioNotFound(id.value()))
    }

    /// 依加入順序迭代
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// 最後加入的情境
    pub fn last(&self) -> Option<&Scenario> {
        self.scenarios.last()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
