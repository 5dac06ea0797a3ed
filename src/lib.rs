// ==========================================
// 物流流向对账引擎 - 核心库
// ==========================================
// 技术栈: Rust + serde + tracing
// 系统定位: 决策支持（只输出报表与建议,是否切换模式由调用方决定）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FlowStage, LocationClass, MonthRange, OperatingMode, YearMonth};

// 领域实体
pub use domain::{
    CatalogEntry, Diagnostic, DiagnosticKind, Diagnostics, ItemRecord, LocationCatalog,
    MonthlyAggregate, Timeline,
};

// 引擎
pub use engine::{
    BalanceValidator, EngineError, FailSafeAdvisor, FlowStageClassifier, LocationClassifier,
    MovementAggregator, ReconciliationEngine, RunReport, TimelineBuilder,
};

// 导入
pub use importer::{RawTable, RecordLoader};

// 配置
pub use config::{ConfigManager, EngineConfigReader, FlowStagePolicy};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物流流向对账引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
