//! 備件模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料類型（由 SPC 代碼對應）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    /// 可修件
    Repairable,
    /// 消耗件
    Expendable,
}

impl MaterialType {
    /// SPC 代碼 2 與 6 為可修件，其餘皆為消耗件
    pub fn from_spc_code(code: i64) -> Self {
        match code {
            2 | 6 => MaterialType::Repairable,
            _ => MaterialType::Expendable,
        }
    }
}

/// 備件（建置範圍中的一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// 料號
    pub pn: String,

    /// 內部代碼（外部查詢的唯一鍵）
    pub ecode: i64,

    /// 描述
    pub description: String,

    /// 數量（> 0）
    pub qty: u32,

    /// 物料類型
    #[serde(rename = "spc")]
    pub material_type: MaterialType,

    /// 提前期（天）
    pub leadtime_days: u32,

    /// 單位取得成本
    pub acq_cost: Decimal,

    /// EIS 關鍵件標記
    pub eis_critical: String,
}

impl Part {
    /// 創建新的備件
    pub fn new(
        pn: String,
        ecode: i64,
        qty: u32,
        leadtime_days: u32,
        acq_cost: Decimal,
    ) -> Self {
        Self {
            pn,
            ecode,
            description: String::new(),
            qty,
            material_type: MaterialType::Expendable,
            leadtime_days,
            acq_cost,
            eis_critical: String::new(),
        }
    }

    /// 建構器模式：設置描述
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// 建構器模式：設置物料類型
    pub fn with_material_type(mut self, material_type: MaterialType) -> Self {
        self.material_type = material_type;
        self
    }

    /// 建構器模式：設置 EIS 關鍵件標記
    pub fn with_eis_critical(mut self, flag: String) -> Self {
        self.eis_critical = flag;
        self
    }

    /// 該行總取得成本（數量 × 單位成本）
    pub fn total_acq_cost(&self) -> Decimal {
        Decimal::from(self.qty) * self.acq_cost
    }

    pub fn is_repairable(&self) -> bool {
        self.material_type == MaterialType::Repairable
    }
}

/// 建置範圍（一次匯入後不再變動）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartCatalog {
    parts: Vec<Part>,
}

impl PartCatalog {
    /// 以已過濾、已解析的備件建立範圍
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// 範圍總價值（Σ 數量 × 單位成本），與情境無關
    pub fn list_value(&self) -> Decimal {
        self.parts.iter().map(Part::total_acq_cost).sum()
    }

    /// 範圍總數量
    pub fn total_qty(&self) -> u64 {
        self.parts.iter().map(|p| u64::from(p.qty)).sum()
    }

    /// 依提前期由長到短排序（相同提前期保持原順序）
    pub fn sort_by_leadtime_desc(&mut self) {
        self.parts
            .sort_by(|a, b| b.leadtime_days.cmp(&a.leadtime_days));
    }
}

impl FromIterator<Part> for PartCatalog {
    fn from_iter<I: IntoIterator<Item = Part>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_catalog() -> PartCatalog {
        PartCatalog::new(vec![
            Part::new("PN-A".to_string(), 1001, 2, 100, Decimal::new(1050, 2)),
            Part::new("PN-B".to_string(), 1002, 5, 200, Decimal::from(100)),
            Part::new("PN-C".to_string(), 1003, 1, 150, Decimal::new(25, 1)),
        ])
    }

    #[rstest]
    #[case(2, MaterialType::Repairable)]
    #[case(6, MaterialType::Repairable)]
    #[case(1, MaterialType::Expendable)]
    #[case(0, MaterialType::Expendable)]
    fn test_spc_mapping(#[case] code: i64, #[case] expected: MaterialType) {
        assert_eq!(MaterialType::from_spc_code(code), expected);
    }

    #[test]
    fn test_part_builder() {
        let part = Part::new("PN-X".to_string(), 42, 3, 127, Decimal::from(10))
            .with_description("Valve".to_string())
            .with_material_type(MaterialType::Repairable)
            .with_eis_critical("Y".to_string());

        assert_eq!(part.description, "Valve");
        assert!(part.is_repairable());
        assert_eq!(part.eis_critical, "Y");
        assert_eq!(part.total_acq_cost(), Decimal::from(30));
    }

    #[test]
    fn test_catalog_totals() {
        let catalog = sample_catalog();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.total_qty(), 8);
        // 21.00 + 500 + 2.5
        assert_eq!(catalog.list_value(), Decimal::new(5235, 1));
    }

    #[test]
    fn test_sort_by_leadtime_desc() {
        let mut catalog = sample_catalog();
        catalog.sort_by_leadtime_desc();

        let leadtimes: Vec<u32> = catalog.iter().map(|p| p.leadtime_days).collect();
        assert_eq!(leadtimes, vec![200, 150, 100]);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = PartCatalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.list_value(), Decimal::ZERO);
        assert_eq!(catalog.total_qty(), 0);
    }
}
