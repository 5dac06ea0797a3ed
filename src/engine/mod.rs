// ==========================================
// 物流流向对账引擎 - 引擎层
// ==========================================
// 职责: 时间线重建 / 阶段判定 / 月度汇总 / 平衡校验 / 模式建议
// 红线: 引擎不做文件 I/O,所有数据问题必须输出诊断
// ==========================================

pub mod advisor;
pub mod aggregator;
pub mod balance;
pub mod classifier;
pub mod error;
pub mod flow_stage;
pub mod orchestrator;
pub mod timeline;

// 重导出核心引擎
pub use advisor::FailSafeAdvisor;
pub use aggregator::{AggregationOutcome, CellCounts, MonthlyCounts, MovementAggregator};
pub use balance::{accuracy_ratio, BalanceValidator, DEFAULT_ACCURACY_THRESHOLD};
pub use classifier::LocationClassifier;
pub use error::{EngineError, EngineResult};
pub use flow_stage::FlowStageClassifier;
pub use orchestrator::{run_with_deadline, with_deadline, ReconciliationEngine, RunReport};
pub use timeline::{LongFormRecord, TimelineBuilder};
