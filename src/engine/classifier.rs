// ==========================================
// 物流流向对账引擎 - 位置分类器
// ==========================================
// 职责: 位置名称 → 位置类别（纯查表）
// 红线: 未登记名称返回 Unknown,不参与汇总
// ==========================================

use crate::domain::item::ItemRecord;
use crate::domain::location::LocationCatalog;
use crate::domain::types::LocationClass;
use std::sync::Arc;

// ==========================================
// LocationClassifier - 位置分类器
// ==========================================
#[derive(Debug, Clone)]
pub struct LocationClassifier {
    catalog: Arc<LocationCatalog>,
}

impl LocationClassifier {
    pub fn new(catalog: Arc<LocationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    /// 位置分类（名称 TRIM 后精确匹配,区分大小写）
    pub fn classify(&self, name: &str) -> LocationClass {
        self.catalog.class_of(name)
    }

    /// 是否直送现场
    ///
    /// # 规则
    /// - 至少 1 次现场到达
    /// - 0 次仓库 / 枢纽到达
    pub fn is_direct_delivery(&self, item: &ItemRecord) -> bool {
        let mut has_site = false;
        for (location, _) in item.observed() {
            match self.classify(location) {
                LocationClass::Warehouse | LocationClass::Hub => return false,
                LocationClass::Site => has_site = true,
                LocationClass::Unknown => {}
            }
        }
        has_site
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn classifier() -> LocationClassifier {
        LocationClassifier::new(Arc::new(LocationCatalog::default_network()))
    }

    fn ts(d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_classify() {
        let c = classifier();
        assert_eq!(c.classify("DSV Indoor"), LocationClass::Warehouse);
        assert_eq!(c.classify(" MOSB "), LocationClass::Hub);
        assert_eq!(c.classify("AGI"), LocationClass::Site);
        assert_eq!(c.classify("agi"), LocationClass::Unknown);
        assert_eq!(c.classify("Jetty"), LocationClass::Unknown);
    }

    #[test]
    fn test_direct_delivery() {
        let c = classifier();
        let direct = ItemRecord::new("C-1")
            .with_arrival("MIR", ts(5))
            .with_empty("DSV Indoor");
        let via_wh = ItemRecord::new("C-2")
            .with_arrival("DSV Indoor", ts(2))
            .with_arrival("MIR", ts(5));
        let via_hub = ItemRecord::new("C-3")
            .with_arrival("MOSB", ts(2))
            .with_arrival("DAS", ts(5));
        let nothing = ItemRecord::new("C-4").with_arrival("Jetty", ts(1));

        assert!(c.is_direct_delivery(&direct));
        assert!(!c.is_direct_delivery(&via_wh));
        assert!(!c.is_direct_delivery(&via_hub));
        assert!(!c.is_direct_delivery(&nothing));
    }
}
