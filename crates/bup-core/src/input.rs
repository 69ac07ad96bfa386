//! 輸入邊界：把操作員輸入的文字解析為已驗證的模型
//!
//! 核心計算只接受型別化、已驗證的輸入；所有格式問題都在這裡以
//! [`BupError`] 回報，並帶上出錯的欄位名稱。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::AnalysisConfig;
use crate::part::{MaterialType, Part, PartCatalog};
use crate::scenario::{BatchPlan, ProcurementPipeline, Scenario, ScenarioDraft};
use crate::{BupError, Result};

/// 日期輸入格式
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// 解析 `DD/MM/YYYY` 日期
pub fn parse_date_dmy(field: &str, text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BupError::EmptyField(field.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| BupError::InvalidDate {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

/// 解析必填的非負整數
pub fn parse_u32(field: &str, text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BupError::EmptyField(field.to_string()));
    }

    trimmed.parse::<u32>().map_err(|_| BupError::InvalidNumber {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

/// 解析非負整數，空白時使用預設值
pub fn parse_u32_or_default(field: &str, text: &str, default: u32) -> Result<u32> {
    if text.trim().is_empty() {
        Ok(default)
    } else {
        parse_u32(field, text)
    }
}

/// 解析選填的非負整數
pub fn parse_optional_u32(field: &str, text: &str) -> Result<Option<u32>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_u32(field, text).map(Some)
    }
}

/// 解析金額，接受逗號或句點作為小數點（`1234,56` / `1234.56`）
pub fn parse_decimal_locale(field: &str, text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BupError::EmptyField(field.to_string()));
    }

    let normalized = trimmed.replace(',', ".");
    Decimal::from_str(&normalized).map_err(|_| BupError::InvalidNumber {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

/// 解析逗號分隔的批次日期；空白表示未配置批次
pub fn parse_batch_dates(text: &str) -> Result<Option<Vec<NaiveDate>>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let dates = text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| parse_date_dmy("batches_dates", token))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(dates))
}

fn parse_i64(field: &str, text: &str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| BupError::InvalidNumber {
        field: field.to_string(),
        value: text.trim().to_string(),
    })
}

/// 情境輸入表單（每個欄位保持操作員輸入的原始文字）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioForm {
    pub t0: String,
    pub hyp_t0_start: String,
    pub acft_delivery_start: String,
    pub material_delivery_start: String,
    pub material_delivery_end: String,
    pub pr_release_approval_vss: String,
    pub po_commercial_condition: String,
    pub po_conversion: String,
    pub export_license: String,
    pub buffer: String,
    pub outbound_logistic: String,
    pub batches_qty: String,
    pub batches_dates: String,
}

impl ScenarioForm {
    /// 以既有情境的值預先填好表單（沿用上一個情境）
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let fmt_date = |d: NaiveDate| d.format(DATE_FORMAT).to_string();
        let batch_plan = scenario.batch_plan.as_ref();

        Self {
            t0: fmt_date(scenario.t0),
            hyp_t0_start: scenario.hyp_t0_start.to_string(),
            acft_delivery_start: fmt_date(scenario.acft_delivery_start),
            material_delivery_start: scenario.material_delivery_start.to_string(),
            material_delivery_end: scenario.material_delivery_end.to_string(),
            pr_release_approval_vss: scenario.pipeline.pr_release_approval_vss.to_string(),
            po_commercial_condition: scenario.pipeline.po_commercial_condition.to_string(),
            po_conversion: scenario.pipeline.po_conversion.to_string(),
            export_license: scenario.pipeline.export_license.to_string(),
            buffer: scenario.pipeline.buffer.to_string(),
            outbound_logistic: scenario.pipeline.outbound_logistic.to_string(),
            batches_qty: batch_plan
                .and_then(|p| p.batches_qty)
                .map(|q| q.to_string())
                .unwrap_or_default(),
            batches_dates: batch_plan
                .map(|p| {
                    p.dates
                        .iter()
                        .map(|d| fmt_date(*d))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default(),
        }
    }

    /// 驗證整張表單；第一個錯誤即返回
    pub fn validate(&self) -> Result<ScenarioDraft> {
        let t0 = parse_date_dmy("t0", &self.t0)?;
        let hyp_t0_start = parse_u32_or_default(
            "hyp_t0_start",
            &self.hyp_t0_start,
            ScenarioDraft::DEFAULT_HYP_T0_START,
        )?;
        let acft_delivery_start = parse_date_dmy("acft_delivery_start", &self.acft_delivery_start)?;
        let material_delivery_start =
            parse_u32("material_delivery_start", &self.material_delivery_start)?;
        let material_delivery_end = parse_u32("material_delivery_end", &self.material_delivery_end)?;

        let pipeline = ProcurementPipeline {
            pr_release_approval_vss: parse_u32_or_default(
                "pr_release_approval_vss",
                &self.pr_release_approval_vss,
                ProcurementPipeline::DEFAULT_PR_RELEASE_APPROVAL_VSS,
            )?,
            po_commercial_condition: parse_u32_or_default(
                "po_commercial_condition",
                &self.po_commercial_condition,
                ProcurementPipeline::DEFAULT_PO_COMMERCIAL_CONDITION,
            )?,
            po_conversion: parse_u32_or_default(
                "po_conversion",
                &self.po_conversion,
                ProcurementPipeline::DEFAULT_PO_CONVERSION,
            )?,
            export_license: parse_u32_or_default(
                "export_license",
                &self.export_license,
                ProcurementPipeline::DEFAULT_EXPORT_LICENSE,
            )?,
            buffer: parse_u32_or_default("buffer", &self.buffer, ProcurementPipeline::DEFAULT_BUFFER)?,
            outbound_logistic: parse_u32_or_default(
                "outbound_logistic",
                &self.outbound_logistic,
                ProcurementPipeline::DEFAULT_OUTBOUND_LOGISTIC,
            )?,
        };

        let batches_qty = parse_optional_u32("batches_qty", &self.batches_qty)?;
        let batch_dates = parse_batch_dates(&self.batches_dates)?;

        let batch_plan = match (batches_qty, batch_dates) {
            (None, None) => None,
            (qty, dates) => Some(BatchPlan {
                batches_qty: qty,
                dates: dates.unwrap_or_default(),
            }),
        };

        let mut draft = ScenarioDraft::new(
            t0,
            acft_delivery_start,
            material_delivery_start,
            material_delivery_end,
        )
        .with_hyp_t0_start(hyp_t0_start)
        .with_pipeline(pipeline);
        draft.batch_plan = batch_plan;

        draft.validate()?;
        Ok(draft)
    }
}

/// 外部載入器提供的原始備件資料列（已合併提前期與成本參考表）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    pub pn: String,
    pub ecode: String,
    pub description: String,
    pub qty: String,
    pub spc: String,
    /// 參考表查無資料時為 None
    pub leadtime: Option<String>,
    pub acq_cost: String,
    pub eis_critical: String,
}

impl PartRecord {
    /// 轉換為備件；數量 ≤ 0 的列返回 `None`（於載入時過濾）
    pub fn into_part(self, config: &AnalysisConfig) -> Result<Option<Part>> {
        let qty = if self.qty.trim().is_empty() {
            0
        } else {
            parse_i64("qty", &self.qty)?
        };
        if qty <= 0 {
            return Ok(None);
        }
        let qty = u32::try_from(qty).map_err(|_| BupError::InvalidNumber {
            field: "qty".to_string(),
            value: self.qty.trim().to_string(),
        })?;

        // 部分系統匯出的 Ecode 帶有 "!" 前綴
        let ecode_text = self.ecode.replace('!', "");
        let ecode = if ecode_text.trim().is_empty() {
            0
        } else {
            parse_i64("ecode", &ecode_text)?
        };

        let material_type = if self.spc.trim().is_empty() {
            MaterialType::Expendable
        } else {
            MaterialType::from_spc_code(parse_i64("spc", &self.spc)?)
        };

        let leadtime_days = match self.leadtime.as_deref() {
            Some(text) => parse_u32_or_default("leadtime", text, config.default_leadtime_days)?,
            None => config.default_leadtime_days,
        };

        let acq_cost = parse_decimal_locale("acq_cost", &self.acq_cost)?;

        let part = Part::new(self.pn.trim().to_string(), ecode, qty, leadtime_days, acq_cost)
            .with_description(self.description.trim().to_string())
            .with_material_type(material_type)
            .with_eis_critical(self.eis_critical.trim().to_string());

        Ok(Some(part))
    }
}

impl PartCatalog {
    /// 由原始資料列建立範圍：過濾數量 ≤ 0，依提前期由長到短排序
    pub fn from_records(records: Vec<PartRecord>, config: &AnalysisConfig) -> Result<Self> {
        let mut parts = Vec::with_capacity(records.len());
        for record in records {
            if let Some(part) = record.into_part(config)? {
                parts.push(part);
            }
        }

        let mut catalog = PartCatalog::new(parts);
        catalog.sort_by_leadtime_desc();
        Ok(catalog)
    }
}
