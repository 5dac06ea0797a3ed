// ==========================================
// 物流流向对账引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、输出报表行
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod diagnostics;
pub mod item;
pub mod location;
pub mod movement;
pub mod report;
pub mod types;

// 重导出核心类型
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLevel, Diagnostics, DiagnosticsSummary};
pub use item::{CurrentStatus, ItemRecord};
pub use location::{CatalogEntry, LocationCatalog};
pub use movement::{MovementEvent, Timeline, TimelineEntry, TimelineFlag};
pub use report::{
    BalanceReport, BalanceSummary, FlowStageRow, InventoryReconciliation, ModeRecommendation,
    MonthlyAggregate, StructuralViolation, StructuralViolationKind,
};
pub use types::{FlowStage, LocationClass, MonthRange, MovementKind, OperatingMode, YearMonth};
