// ==========================================
// 物流流向对账引擎 - 月度进出存汇总器
// ==========================================
// 职责: 时间线 → (月份 × 位置) 入库/出库/月末库存
// 输入: ItemRecord + Timeline + MonthRange
// 输出: 稠密月度表（月份升序 × 目录顺序）+ 库存口径对账警告
// 红线: 逐件计算后按单元格整数相加合并,合并满足结合律与交换律
// ==========================================

use crate::domain::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::domain::item::ItemRecord;
use crate::domain::location::LocationCatalog;
use crate::domain::movement::Timeline;
use crate::domain::report::{InventoryReconciliation, MonthlyAggregate};
use crate::domain::types::{MonthRange, YearMonth};
use crate::engine::timeline::TimelineBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// CellCounts / MonthlyCounts - 可合并的计数表
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub inbound: u64,
    pub outbound: u64,
    pub inventory: u64,
}

impl CellCounts {
    fn add(&mut self, other: &CellCounts) {
        self.inbound += other.inbound;
        self.outbound += other.outbound;
        self.inventory += other.inventory;
    }
}

/// (月份, 目录序号) → 计数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyCounts {
    cells: BTreeMap<(YearMonth, usize), CellCounts>,
}

impl MonthlyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inbound(&mut self, month: YearMonth, location: usize) {
        self.cells.entry((month, location)).or_default().inbound += 1;
    }

    pub fn add_outbound(&mut self, month: YearMonth, location: usize) {
        self.cells.entry((month, location)).or_default().outbound += 1;
    }

    pub fn add_inventory(&mut self, month: YearMonth, location: usize) {
        self.cells.entry((month, location)).or_default().inventory += 1;
    }

    /// 合并（逐单元格整数相加）
    pub fn merge(mut self, other: MonthlyCounts) -> MonthlyCounts {
        for (key, counts) in other.cells {
            self.cells.entry(key).or_default().add(&counts);
        }
        self
    }

    pub fn get(&self, month: YearMonth, location: usize) -> CellCounts {
        self.cells
            .get(&(month, location))
            .copied()
            .unwrap_or_default()
    }

    /// 覆写月末库存（对账后）
    fn set_inventory(&mut self, month: YearMonth, location: usize, value: u64) {
        self.cells.entry((month, location)).or_default().inventory = value;
    }
}

// ==========================================
// AggregationOutcome - 汇总结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOutcome {
    pub aggregates: Vec<MonthlyAggregate>,
    pub opening_inventory: BTreeMap<String, u64>, // 区间首月之前的月末库存
    pub reconciliations: Vec<InventoryReconciliation>,
    pub reconciled_month: Option<YearMonth>, // 已按状态快照对账的月份（区间早于最新观测时为 None）
}

// ==========================================
// MovementAggregator - 月度进出存汇总器
// ==========================================
#[derive(Debug, Clone)]
pub struct MovementAggregator {
    catalog: Arc<LocationCatalog>,
    timeline_builder: TimelineBuilder,
}

impl MovementAggregator {
    pub fn new(catalog: Arc<LocationCatalog>, timeline_builder: TimelineBuilder) -> Self {
        Self {
            catalog,
            timeline_builder,
        }
    }

    /// 汇总（内部构建时间线）
    pub fn aggregate(
        &self,
        items: &[ItemRecord],
        range: MonthRange,
        diagnostics: &mut Diagnostics,
    ) -> AggregationOutcome {
        let timelines = self.timeline_builder.build_all(items, diagnostics);
        self.aggregate_timelines(items, &timelines, range, diagnostics)
    }

    /// 汇总（使用已构建的时间线,timelines 与 items 同序）
    ///
    /// # 规则
    /// - 入库: 到达时间落在当月
    /// - 出库: 下一个严格更晚的其他位置到达落在当月（直送现场货物不计出库）
    /// - 月末库存: 截至月末最后一次到达的位置
    /// - 区间末月: 与状态快照口径对账,不一致取较小值
    ///   （仅当区间末月不早于最新观测月份; 快照描述的是当前位置）
    #[instrument(skip_all, fields(items = items.len(), range = %range))]
    pub fn aggregate_timelines(
        &self,
        items: &[ItemRecord],
        timelines: &[Timeline],
        range: MonthRange,
        diagnostics: &mut Diagnostics,
    ) -> AggregationOutcome {
        let months = range.months();
        let opening_month = range.start.prev();

        // === 步骤 1: 逐件计数 + 合并 ===
        let classifier = self.timeline_builder.classifier();
        let mut counts = items
            .iter()
            .zip(timelines)
            .map(|(item, timeline)| {
                let direct = classifier.is_direct_delivery(item);
                self.item_counts(timeline, range, &months, direct)
            })
            .fold(MonthlyCounts::new(), MonthlyCounts::merge);

        let opening = timelines
            .iter()
            .map(|timeline| self.inventory_counts(timeline, &[opening_month]))
            .fold(MonthlyCounts::new(), MonthlyCounts::merge);

        // === 步骤 2: 区间末月库存对账 ===
        let latest_observed = timelines
            .iter()
            .filter_map(|t| t.final_entry())
            .map(|e| YearMonth::of(&e.timestamp))
            .max();
        let reconciled_month = match latest_observed {
            Some(latest) if range.end < latest => {
                debug!(range_end = %range.end, latest = %latest, "区间早于最新观测,跳过状态快照对账");
                None
            }
            _ => Some(range.end),
        };
        let reconciliations = match reconciled_month {
            Some(month) => {
                self.reconcile_final_month(items, timelines, month, &mut counts, diagnostics)
            }
            None => Vec::new(),
        };

        // === 步骤 3: 展开为稠密表 ===
        let mut aggregates = Vec::with_capacity(months.len() * self.catalog.len());
        for month in &months {
            for (order, entry) in self.catalog.entries().iter().enumerate() {
                let cell = counts.get(*month, order);
                aggregates.push(MonthlyAggregate {
                    month: *month,
                    location: entry.name.clone(),
                    class: entry.class,
                    inbound_count: cell.inbound,
                    outbound_count: cell.outbound,
                    inventory_count: cell.inventory,
                });
            }
        }

        let opening_inventory = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(order, entry)| (entry.name.clone(), opening.get(opening_month, order).inventory))
            .collect();

        debug!(rows = aggregates.len(), "月度汇总完成");

        AggregationOutcome {
            aggregates,
            opening_inventory,
            reconciliations,
            reconciled_month,
        }
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    fn item_counts(
        &self,
        timeline: &Timeline,
        range: MonthRange,
        months: &[YearMonth],
        direct_delivery: bool,
    ) -> MonthlyCounts {
        let mut counts = self.inventory_counts(timeline, months);

        for (idx, entry) in timeline.entries.iter().enumerate() {
            let arrived = YearMonth::of(&entry.timestamp);
            if range.contains(arrived) {
                counts.add_inbound(arrived, entry.catalog_order);
            }
            if direct_delivery {
                continue;
            }
            if let Some(departed_at) = timeline.departure_after(idx) {
                let departed = YearMonth::of(&departed_at);
                if range.contains(departed) {
                    counts.add_outbound(departed, entry.catalog_order);
                }
            }
        }
        counts
    }

    fn inventory_counts(&self, timeline: &Timeline, months: &[YearMonth]) -> MonthlyCounts {
        let mut counts = MonthlyCounts::new();
        for month in months {
            let Some(month_end) = month.end_exclusive() else {
                continue;
            };
            if let Some(entry) = timeline.latest_before(month_end) {
                counts.add_inventory(*month, entry.catalog_order);
            }
        }
        counts
    }

    /// 区间末月: 时间线口径 vs 状态快照口径
    fn reconcile_final_month(
        &self,
        items: &[ItemRecord],
        timelines: &[Timeline],
        month: YearMonth,
        counts: &mut MonthlyCounts,
        diagnostics: &mut Diagnostics,
    ) -> Vec<InventoryReconciliation> {
        let Some(month_end) = month.end_exclusive() else {
            return Vec::new();
        };

        let mut status_counts: BTreeMap<usize, u64> = BTreeMap::new();
        let mut disagreeing: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();

        for (item, timeline) in items.iter().zip(timelines) {
            let by_timeline = timeline.latest_before(month_end).map(|e| e.catalog_order);
            let by_status = match &item.current_status {
                Some(status) => self.catalog.order_of(&status.location),
                None => by_timeline,
            };

            if let Some(order) = by_status {
                *status_counts.entry(order).or_insert(0) += 1;
            }
            if by_timeline != by_status {
                for order in [by_timeline, by_status].into_iter().flatten() {
                    disagreeing
                        .entry(order)
                        .or_default()
                        .insert(item.item_id.clone());
                }
            }
        }

        let mut reconciliations = Vec::new();
        for (order, entry) in self.catalog.entries().iter().enumerate() {
            let timeline_count = counts.get(month, order).inventory;
            let status_count = status_counts.get(&order).copied().unwrap_or(0);
            if timeline_count == status_count {
                continue;
            }

            let reported_count = timeline_count.min(status_count);
            counts.set_inventory(month, order, reported_count);

            let disagreeing_items: Vec<String> = disagreeing
                .remove(&order)
                .map(|ids| ids.into_iter().collect())
                .unwrap_or_default();

            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::InventoryReconciliation,
                    format!(
                        "{} {} 月末库存口径不一致: 时间线 {} / 状态快照 {},按 {} 报告",
                        month, entry.name, timeline_count, status_count, reported_count
                    ),
                )
                .on_field(&entry.name),
            );

            reconciliations.push(InventoryReconciliation {
                month,
                location: entry.name.clone(),
                timeline_count,
                status_count,
                reported_count,
                disagreeing_items,
            });
        }
        reconciliations
    }
}
