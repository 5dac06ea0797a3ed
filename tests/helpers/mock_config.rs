// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use flow_reconciler::config::error::ConfigResult;
use flow_reconciler::config::{EngineConfigReader, FlowStagePolicy};
use flow_reconciler::domain::location::{CatalogEntry, LocationCatalog};
use flow_reconciler::domain::types::{LocationClass, OperatingMode};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub accuracy_threshold: f64,
    pub defensive_mode: OperatingMode,
    pub default_mode: OperatingMode,
    pub id_column: String,
    pub catalog: Vec<CatalogEntry>,
    pub policy: FlowStagePolicy,
    pub deadline_ms: u64,
}

impl MockConfig {
    /// 小型网络: 2 仓库 + 1 枢纽 + 2 现场
    pub fn small_network() -> Self {
        Self {
            accuracy_threshold: 0.9,
            defensive_mode: OperatingMode::CostGuard,
            default_mode: OperatingMode::Oracle,
            id_column: "Item".to_string(),
            catalog: vec![
                CatalogEntry::new("WH-A", LocationClass::Warehouse),
                CatalogEntry::new("WH-B", LocationClass::Warehouse),
                CatalogEntry::new("HUB", LocationClass::Hub),
                CatalogEntry::new("SITE-1", LocationClass::Site),
                CatalogEntry::new("SITE-2", LocationClass::Site),
            ],
            policy: FlowStagePolicy::canonical(),
            deadline_ms: 5_000,
        }
    }
}

impl EngineConfigReader for MockConfig {
    fn get_accuracy_threshold(&self) -> ConfigResult<f64> {
        Ok(self.accuracy_threshold)
    }

    fn get_defensive_mode(&self) -> ConfigResult<OperatingMode> {
        Ok(self.defensive_mode)
    }

    fn get_default_mode(&self) -> ConfigResult<OperatingMode> {
        Ok(self.default_mode)
    }

    fn get_id_column(&self) -> ConfigResult<String> {
        Ok(self.id_column.clone())
    }

    fn get_status_class_column(&self) -> ConfigResult<String> {
        Ok("Status_Current".to_string())
    }

    fn get_status_location_column(&self) -> ConfigResult<String> {
        Ok("Status_Location".to_string())
    }

    fn get_ignored_columns(&self) -> ConfigResult<Vec<String>> {
        Ok(vec!["Remark".to_string()])
    }

    fn get_location_catalog(&self) -> ConfigResult<LocationCatalog> {
        Ok(LocationCatalog::from_entries(self.catalog.clone()).unwrap())
    }

    fn get_stage_policy(&self) -> ConfigResult<FlowStagePolicy> {
        Ok(self.policy.clone())
    }

    fn get_batch_deadline_ms(&self) -> ConfigResult<u64> {
        Ok(self.deadline_ms)
    }
}
