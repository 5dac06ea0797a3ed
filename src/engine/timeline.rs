// ==========================================
// 物流流向对账引擎 - 事件时间线构建器
// ==========================================
// 职责: 宽表记录 → 长表 (item, location, timestamp) → 按货物分组排序
// 输入: ItemRecord 列表（只读）
// 输出: Timeline（有序到达序列 + 单调性标记）, MovementEvent
// 红线: 纯计算,同一输入必须产生同一输出
// ==========================================

use crate::domain::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::domain::item::ItemRecord;
use crate::domain::movement::{MovementEvent, Timeline, TimelineEntry, TimelineFlag};
use crate::domain::types::{LocationClass, MovementKind};
use crate::engine::classifier::LocationClassifier;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, instrument};

// ==========================================
// LongFormRecord - 长表记录（一条到达观测）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongFormRecord {
    pub item_index: usize, // 源记录序号（主键可能重复,分组以序号为准）
    pub item_id: String,
    pub location: String,
    pub timestamp: NaiveDateTime,
}

// ==========================================
// TimelineBuilder - 事件时间线构建器
// ==========================================
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    classifier: LocationClassifier,
}

impl TimelineBuilder {
    pub fn new(classifier: LocationClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &LocationClassifier {
        &self.classifier
    }

    /// 宽表 → 长表（丢弃空单元格,保持记录顺序）
    pub fn reshape(&self, items: &[ItemRecord]) -> Vec<LongFormRecord> {
        items
            .iter()
            .enumerate()
            .flat_map(|(item_index, item)| {
                item.observed().map(move |(location, ts)| LongFormRecord {
                    item_index,
                    item_id: item.item_id.clone(),
                    location: location.to_string(),
                    timestamp: *ts,
                })
            })
            .collect()
    }

    /// 批量构建时间线（长表分组 + 组内排序）
    ///
    /// # 返回
    /// - 与 items 一一对应的时间线（同序）
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn build_all(&self, items: &[ItemRecord], diagnostics: &mut Diagnostics) -> Vec<Timeline> {
        let long_form = self.reshape(items);
        debug!(observations = long_form.len(), "长表已生成");

        let mut groups: Vec<Vec<(String, NaiveDateTime)>> = vec![Vec::new(); items.len()];
        for record in long_form {
            groups[record.item_index].push((record.location, record.timestamp));
        }

        items
            .iter()
            .zip(groups)
            .map(|(item, observations)| self.assemble(item, observations, diagnostics))
            .collect()
    }

    /// 构建单件货物的时间线
    pub fn build_timeline(&self, item: &ItemRecord, diagnostics: &mut Diagnostics) -> Timeline {
        let observations = item
            .observed()
            .map(|(location, ts)| (location.to_string(), *ts))
            .collect();
        self.assemble(item, observations, diagnostics)
    }

    /// 推断移动事件
    ///
    /// # 规则
    /// - 每条到达生成一个 Arrival
    /// - 位置 L 的 Departure 发生在其他位置严格更晚的最早到达时刻
    /// - 最终所在位置无 Departure
    pub fn movement_events(&self, timeline: &Timeline) -> Vec<MovementEvent> {
        let mut events = Vec::with_capacity(timeline.len() * 2);
        for (idx, entry) in timeline.entries.iter().enumerate() {
            events.push(MovementEvent {
                item_id: timeline.item_id.clone(),
                location: entry.location.clone(),
                class: entry.class,
                timestamp: entry.timestamp,
                kind: MovementKind::Arrival,
            });
            if let Some(departed_at) = timeline.departure_after(idx) {
                events.push(MovementEvent {
                    item_id: timeline.item_id.clone(),
                    location: entry.location.clone(),
                    class: entry.class,
                    timestamp: departed_at,
                    kind: MovementKind::Departure,
                });
            }
        }
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        events
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    fn assemble(
        &self,
        item: &ItemRecord,
        observations: Vec<(String, NaiveDateTime)>,
        diagnostics: &mut Diagnostics,
    ) -> Timeline {
        let catalog = self.classifier.catalog();
        let mut by_location: HashMap<String, TimelineEntry> = HashMap::new();
        let mut unknown_locations = Vec::new();

        for (raw_name, ts) in observations {
            let class = self.classifier.classify(&raw_name);
            let name = raw_name.trim().to_string();

            let Some(order) = catalog.order_of(&name).filter(|_| class != LocationClass::Unknown)
            else {
                diagnostics.push(
                    Diagnostic::info(
                        DiagnosticKind::UnknownLocation,
                        format!("位置 {} 未登记,到达记录 {} 不计入", name, ts),
                    )
                    .for_item(&item.item_id)
                    .at_row(item.row_number)
                    .on_field(&name),
                );
                unknown_locations.push(name);
                continue;
            };

            match by_location.get_mut(&name) {
                Some(existing) => {
                    // 同一位置重复出现,保留最早到达
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::DuplicateLocation,
                            format!(
                                "位置 {} 出现多次 ({} / {}),保留较早时间",
                                name, existing.timestamp, ts
                            ),
                        )
                        .for_item(&item.item_id)
                        .at_row(item.row_number)
                        .on_field(&name),
                    );
                    if ts < existing.timestamp {
                        existing.timestamp = ts;
                    }
                }
                None => {
                    by_location.insert(
                        name.clone(),
                        TimelineEntry {
                            location: name,
                            class,
                            timestamp: ts,
                            catalog_order: order,
                        },
                    );
                }
            }
        }

        let mut entries: Vec<TimelineEntry> = by_location.into_values().collect();
        entries.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.catalog_order.cmp(&b.catalog_order))
        });
        unknown_locations.sort();

        let flags = Self::monotonicity_flags(&entries);
        if !flags.is_empty() {
            let details: Vec<String> = flags.iter().map(|f| f.describe()).collect();
            diagnostics.push(
                Diagnostic::warning(DiagnosticKind::NonMonotonicTimeline, details.join("; "))
                    .for_item(&item.item_id)
                    .at_row(item.row_number),
            );
        }

        Timeline {
            item_id: item.item_id.clone(),
            entries,
            flags,
            unknown_locations,
        }
    }

    /// 单调性检查: 路径等级回退 + 同时间戳
    fn monotonicity_flags(entries: &[TimelineEntry]) -> Vec<TimelineFlag> {
        let mut flags = Vec::new();
        for pair in entries.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.timestamp == next.timestamp {
                flags.push(TimelineFlag::TimestampTie {
                    first: prev.location.clone(),
                    second: next.location.clone(),
                    at: next.timestamp,
                });
            }
            if let (Some(a), Some(b)) = (prev.class.path_rank(), next.class.path_rank()) {
                if b < a {
                    flags.push(TimelineFlag::ClassRegression {
                        from: prev.location.clone(),
                        to: next.location.clone(),
                        at: next.timestamp,
                    });
                }
            }
        }
        flags
    }
}
