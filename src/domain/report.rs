// ==========================================
// 物流流向对账引擎 - 输出报表行
// ==========================================
// 用途: 报表/看板协作方消费的结构化输出
// 生命周期: 每次运行从完整快照重新生成
// ==========================================

use crate::domain::types::{FlowStage, LocationClass, MonthRange, OperatingMode, YearMonth};
use serde::{Deserialize, Serialize};

// ==========================================
// MonthlyAggregate - 月度进出存
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: YearMonth,
    pub location: String,
    pub class: LocationClass,
    pub inbound_count: u64,   // 当月到达件数
    pub outbound_count: u64,  // 当月离开件数（推断）
    pub inventory_count: u64, // 月末在库件数
}

// ==========================================
// FlowStageRow - 流向阶段输出行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStageRow {
    pub item_id: String,
    pub stage: FlowStage,
    pub stage_code: u8,
    pub label: String,
    pub direct_delivery: bool,  // 直送现场（无仓库/枢纽到达）
    pub note: Option<String>,   // 诊断说明（如仅有未登记位置）
}

// ==========================================
// BalanceReport - 月度平衡校验
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub month: YearMonth,
    pub outbound_total: u64,     // 仓库 + 枢纽出库合计
    pub site_inbound_total: u64, // 现场入库合计
    pub accuracy_ratio: f64,     // min/max,双 0 时为 1.0
    pub pass: bool,
}

// ==========================================
// BalanceSummary - 全区间平衡汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub range: Option<MonthRange>,
    pub outbound_total: u64,
    pub site_inbound_total: u64,
    pub accuracy_ratio: f64,
    pub pass: bool,
    pub failing_months: Vec<YearMonth>,
}

// ==========================================
// StructuralViolation - 结构性平衡违规（警告,不中断）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructuralViolationKind {
    OutboundExceedsStock, // 出库 > 期初库存 + 当月入库
    ConservationBreak,    // 期初 + 入库 - 出库 ≠ 期末
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralViolation {
    pub month: YearMonth,
    pub location: String,
    pub kind: StructuralViolationKind,
    pub expected: i64,
    pub actual: i64,
    pub message: String,
}

// ==========================================
// InventoryReconciliation - 库存口径对账警告
// ==========================================
// 时间线口径与状态快照口径不一致时,保守取较小值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReconciliation {
    pub month: YearMonth,
    pub location: String,
    pub timeline_count: u64,
    pub status_count: u64,
    pub reported_count: u64,
    pub disagreeing_items: Vec<String>,
}

// ==========================================
// ModeRecommendation - 运行模式建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRecommendation {
    pub current_mode: OperatingMode,
    pub recommended_mode: OperatingMode,
    pub reason: String,
    pub accuracy: f64,
    pub threshold: f64,
    pub should_alert: bool,
}
