// ==========================================
// 物流流向对账引擎 - 月度平衡校验器
// ==========================================
// 职责: 仓库/枢纽出库 vs 现场入库 的月度一致性
// 输入: MonthlyAggregate（稠密表）
// 输出: BalanceReport / BalanceSummary / StructuralViolation
// 红线: 校验结果仅作为信息输出,不中断运行
// ==========================================

use crate::domain::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::domain::report::{
    BalanceReport, BalanceSummary, MonthlyAggregate, StructuralViolation, StructuralViolationKind,
};
use crate::domain::types::{LocationClass, MonthRange, YearMonth};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// 默认准确率阈值
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 0.99;

/// 准确率 = min / max（双 0 时为 1.0）
pub fn accuracy_ratio(outbound_total: u64, site_inbound_total: u64) -> f64 {
    let max = outbound_total.max(site_inbound_total);
    if max == 0 {
        return 1.0;
    }
    outbound_total.min(site_inbound_total) as f64 / max as f64
}

// ==========================================
// BalanceValidator - 月度平衡校验器
// ==========================================
#[derive(Debug, Clone)]
pub struct BalanceValidator {
    threshold: f64,
}

impl BalanceValidator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 月度平衡校验
    ///
    /// # 口径
    /// - outbound_total = 当月仓库 + 枢纽出库合计
    /// - site_inbound_total = 当月现场入库合计
    /// - pass = accuracy_ratio >= threshold
    #[instrument(skip_all, fields(rows = aggregates.len(), threshold = self.threshold))]
    pub fn validate(
        &self,
        aggregates: &[MonthlyAggregate],
        diagnostics: &mut Diagnostics,
    ) -> Vec<BalanceReport> {
        let mut totals: BTreeMap<YearMonth, (u64, u64)> = BTreeMap::new();
        for row in aggregates {
            let slot = totals.entry(row.month).or_insert((0, 0));
            match row.class {
                LocationClass::Warehouse | LocationClass::Hub => slot.0 += row.outbound_count,
                LocationClass::Site => slot.1 += row.inbound_count,
                LocationClass::Unknown => {}
            }
        }

        totals
            .into_iter()
            .map(|(month, (outbound_total, site_inbound_total))| {
                if outbound_total == 0 && site_inbound_total == 0 {
                    diagnostics.push(Diagnostic::info(
                        DiagnosticKind::ZeroDenominatorInRatio,
                        format!("{} 出库与现场入库均为 0,准确率按 1.0 处理", month),
                    ));
                }
                let ratio = accuracy_ratio(outbound_total, site_inbound_total);
                BalanceReport {
                    month,
                    outbound_total,
                    site_inbound_total,
                    accuracy_ratio: ratio,
                    pass: ratio >= self.threshold,
                }
            })
            .collect()
    }

    /// 全区间汇总
    pub fn summarize(&self, reports: &[BalanceReport]) -> BalanceSummary {
        let outbound_total: u64 = reports.iter().map(|r| r.outbound_total).sum();
        let site_inbound_total: u64 = reports.iter().map(|r| r.site_inbound_total).sum();
        let ratio = accuracy_ratio(outbound_total, site_inbound_total);

        let range = match (reports.first(), reports.last()) {
            (Some(first), Some(last)) => MonthRange::new(first.month, last.month),
            _ => None,
        };
        let failing_months: Vec<YearMonth> = reports
            .iter()
            .filter(|r| !r.pass)
            .map(|r| r.month)
            .collect();

        info!(
            outbound_total,
            site_inbound_total,
            accuracy = ratio,
            failing = failing_months.len(),
            "平衡校验汇总"
        );

        BalanceSummary {
            range,
            outbound_total,
            site_inbound_total,
            accuracy_ratio: ratio,
            pass: ratio >= self.threshold,
            failing_months,
        }
    }

    /// 结构性检查（逐位置逐月）
    ///
    /// # 检查项
    /// 1. 出库 <= 上月末库存 + 当月入库
    /// 2. 上月末库存 + 入库 - 出库 = 月末库存（reconciled_month 跳过）
    ///
    /// # 参数
    /// - opening_inventory: 区间首月之前的月末库存
    /// - reconciled_month: 已按状态快照对账的月份
    pub fn structural_checks(
        &self,
        aggregates: &[MonthlyAggregate],
        opening_inventory: &BTreeMap<String, u64>,
        reconciled_month: Option<YearMonth>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<StructuralViolation> {
        let mut by_location: BTreeMap<&str, Vec<&MonthlyAggregate>> = BTreeMap::new();
        for row in aggregates {
            by_location.entry(row.location.as_str()).or_default().push(row);
        }

        let mut violations = Vec::new();
        for (location, mut rows) in by_location {
            rows.sort_by_key(|r| r.month);
            let mut prev_inventory = opening_inventory.get(location).copied().unwrap_or(0) as i64;

            for row in rows {
                let inbound = row.inbound_count as i64;
                let outbound = row.outbound_count as i64;
                let closing = row.inventory_count as i64;
                let available = prev_inventory + inbound;

                if outbound > available {
                    violations.push(StructuralViolation {
                        month: row.month,
                        location: location.to_string(),
                        kind: StructuralViolationKind::OutboundExceedsStock,
                        expected: available,
                        actual: outbound,
                        message: format!(
                            "{} {} 出库 {} 超过可用库存 {}（期初 {} + 入库 {}）",
                            row.month, location, outbound, available, prev_inventory, inbound
                        ),
                    });
                }

                if reconciled_month != Some(row.month) && available - outbound != closing {
                    violations.push(StructuralViolation {
                        month: row.month,
                        location: location.to_string(),
                        kind: StructuralViolationKind::ConservationBreak,
                        expected: available - outbound,
                        actual: closing,
                        message: format!(
                            "{} {} 库存不守恒: 期初 {} + 入库 {} - 出库 {} ≠ 期末 {}",
                            row.month, location, prev_inventory, inbound, outbound, closing
                        ),
                    });
                }

                prev_inventory = closing;
            }
        }

        violations.sort_by(|a, b| a.month.cmp(&b.month).then(a.location.cmp(&b.location)));
        for violation in &violations {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::StructuralBalanceViolation,
                    violation.message.clone(),
                )
                .on_field(&violation.location),
            );
        }
        violations
    }
}

impl Default for BalanceValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCURACY_THRESHOLD)
    }
}
