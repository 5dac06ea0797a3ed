// ==========================================
// 物流流向对账引擎 - 数据质量诊断
// ==========================================
// 职责: 将非致命的数据问题记录为数据值（而非控制流分支）
// 红线: 任何货物不得被静默丢弃,最差情况也要留下诊断
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

// ==========================================
// DiagnosticKind - 诊断类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    MalformedTimestamp,         // 时间戳无法解析（单元格被丢弃）
    UnknownLocationColumn,      // 表中存在未登记位置列
    UnknownLocation,            // 记录中存在未登记位置（非表格来源）
    UnknownOnlyArrivals,        // 仅有未登记位置的到达
    NonMonotonicTimeline,       // 路径不单调
    DuplicateLocation,          // 同一位置重复出现（保留最早时间）
    MissingIdentifier,          // 主键缺失（以行号代替）
    DuplicateIdentifier,        // 主键重复
    StatusMismatch,             // 状态快照与目录不一致
    ZeroDenominatorInRatio,     // 比率分母为 0（按 1.0 处理）
    StructuralBalanceViolation, // 结构性平衡违规
    InventoryReconciliation,    // 库存口径不一致（取较小值）
    StagePolicyGap,             // 阶段策略未覆盖（按 Stage 0 处理）
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MalformedTimestamp => "MALFORMED_TIMESTAMP",
            DiagnosticKind::UnknownLocationColumn => "UNKNOWN_LOCATION_COLUMN",
            DiagnosticKind::UnknownLocation => "UNKNOWN_LOCATION",
            DiagnosticKind::UnknownOnlyArrivals => "UNKNOWN_ONLY_ARRIVALS",
            DiagnosticKind::NonMonotonicTimeline => "NON_MONOTONIC_TIMELINE",
            DiagnosticKind::DuplicateLocation => "DUPLICATE_LOCATION",
            DiagnosticKind::MissingIdentifier => "MISSING_IDENTIFIER",
            DiagnosticKind::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            DiagnosticKind::StatusMismatch => "STATUS_MISMATCH",
            DiagnosticKind::ZeroDenominatorInRatio => "ZERO_DENOMINATOR_IN_RATIO",
            DiagnosticKind::StructuralBalanceViolation => "STRUCTURAL_BALANCE_VIOLATION",
            DiagnosticKind::InventoryReconciliation => "INVENTORY_RECONCILIATION",
            DiagnosticKind::StagePolicyGap => "STAGE_POLICY_GAP",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// DiagnosticLevel - 诊断级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticLevel {
    Error,   // 错误（数据问题严重,但不中断运行）
    Warning, // 警告
    Info,    // 提示（仅记录）
}

// ==========================================
// Diagnostic - 单条诊断记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub level: DiagnosticLevel,
    pub item_id: Option<String>,   // 货物标识（如果可定位）
    pub row_number: Option<usize>, // 原始行号（如果来自表格）
    pub field: Option<String>,     // 相关列/位置
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            kind,
            level,
            item_id: None,
            row_number: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(kind, DiagnosticLevel::Warning, message)
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(kind, DiagnosticLevel::Info, message)
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(kind, DiagnosticLevel::Error, message)
    }

    pub fn for_item(mut self, item_id: &str) -> Self {
        self.item_id = Some(item_id.to_string());
        self
    }

    pub fn at_row(mut self, row_number: usize) -> Self {
        if row_number > 0 {
            self.row_number = Some(row_number);
        }
        self
    }

    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

// ==========================================
// Diagnostics - 诊断收集器
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条诊断（Warning/Error 同步输出 warn 日志）
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Error | DiagnosticLevel::Warning => warn!(
                kind = %diagnostic.kind,
                item_id = diagnostic.item_id.as_deref().unwrap_or("-"),
                field = diagnostic.field.as_deref().unwrap_or("-"),
                "数据质量问题: {}",
                diagnostic.message
            ),
            DiagnosticLevel::Info => debug!(
                kind = %diagnostic.kind,
                item_id = diagnostic.item_id.as_deref().unwrap_or("-"),
                "{}",
                diagnostic.message
            ),
        }
        self.entries.push(diagnostic);
    }

    /// 合并另一个收集器（保持顺序）
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// 生成汇总
    pub fn summary(&self) -> DiagnosticsSummary {
        let mut by_kind: BTreeMap<DiagnosticKind, usize> = BTreeMap::new();
        for d in &self.entries {
            *by_kind.entry(d.kind).or_insert(0) += 1;
        }

        let count_level = |level: DiagnosticLevel| {
            self.entries.iter().filter(|d| d.level == level).count()
        };

        DiagnosticsSummary {
            total: self.entries.len(),
            errors: count_level(DiagnosticLevel::Error),
            warnings: count_level(DiagnosticLevel::Warning),
            infos: count_level(DiagnosticLevel::Info),
            by_kind,
        }
    }
}

// ==========================================
// DiagnosticsSummary - 诊断汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub by_kind: BTreeMap<DiagnosticKind, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_by_kind_and_level() {
        let mut diags = Diagnostics::new();
        diags.push(
            Diagnostic::warning(DiagnosticKind::MalformedTimestamp, "bad cell")
                .for_item("C-1")
                .on_field("MOSB"),
        );
        diags.push(Diagnostic::warning(DiagnosticKind::MalformedTimestamp, "bad cell 2"));
        diags.push(Diagnostic::info(DiagnosticKind::ZeroDenominatorInRatio, "0/0"));
        diags.push(Diagnostic::error(DiagnosticKind::MissingIdentifier, "blank id").at_row(7));

        let summary = diags.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.infos, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.by_kind.get(&DiagnosticKind::MalformedTimestamp), Some(&2));
        assert_eq!(diags.count_of(DiagnosticKind::MissingIdentifier), 1);
        assert_eq!(
            diags.of_kind(DiagnosticKind::MissingIdentifier).next().unwrap().row_number,
            Some(7)
        );
    }

    #[test]
    fn test_at_row_zero_is_not_recorded() {
        let d = Diagnostic::info(DiagnosticKind::UnknownLocation, "x").at_row(0);
        assert_eq!(d.row_number, None);
    }
}
