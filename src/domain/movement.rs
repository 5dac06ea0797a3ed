// ==========================================
// 物流流向对账引擎 - 时间线与移动事件
// ==========================================
// 用途: 引擎派生产物,每次运行重新计算,不落库
// ==========================================

use crate::domain::types::{LocationClass, MovementKind};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// TimelineEntry - 时间线条目（一次到达）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub location: String,
    pub class: LocationClass,
    pub timestamp: NaiveDateTime,
    pub catalog_order: usize, // 目录声明序号（同时间戳排序口径）
}

// ==========================================
// TimelineFlag - 路径单调性标记（非致命）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineFlag {
    /// 路径等级回退（如 Site → Warehouse）
    ClassRegression {
        from: String,
        to: String,
        at: NaiveDateTime,
    },
    /// 不同位置时间戳相同,顺序依赖目录声明顺序
    TimestampTie {
        first: String,
        second: String,
        at: NaiveDateTime,
    },
}

impl TimelineFlag {
    pub fn describe(&self) -> String {
        match self {
            TimelineFlag::ClassRegression { from, to, at } => {
                format!("路径等级回退: {} → {} @ {}", from, to, at)
            }
            TimelineFlag::TimestampTie { first, second, at } => {
                format!("时间戳相同: {} / {} @ {}（按目录顺序排列）", first, second, at)
            }
        }
    }
}

// ==========================================
// Timeline - 单件货物的有序到达序列
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub item_id: String,
    pub entries: Vec<TimelineEntry>,       // 已按 (timestamp, catalog_order) 升序
    pub flags: Vec<TimelineFlag>,          // 单调性标记
    pub unknown_locations: Vec<String>,    // 被剔除的未登记位置（有时间戳）
}

impl Timeline {
    /// 空时间线 = Pre-Arrival
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_monotonic(&self) -> bool {
        self.flags.is_empty()
    }

    /// 到访的不同仓库数量
    pub fn warehouses_visited(&self) -> usize {
        // 同一位置每件至多一列,条目天然去重
        self.entries
            .iter()
            .filter(|e| e.class == LocationClass::Warehouse)
            .count()
    }

    pub fn visits_hub(&self) -> bool {
        self.entries.iter().any(|e| e.class == LocationClass::Hub)
    }

    pub fn visits_site(&self) -> bool {
        self.entries.iter().any(|e| e.class == LocationClass::Site)
    }

    /// 仅剩未登记位置（有原始时间戳但全部被剔除）
    pub fn has_only_unknown(&self) -> bool {
        self.entries.is_empty() && !self.unknown_locations.is_empty()
    }

    /// 第 idx 条之后的离开时间: 严格晚于该到达的最早其他位置时间戳
    pub fn departure_after(&self, idx: usize) -> Option<NaiveDateTime> {
        let entry = self.entries.get(idx)?;
        self.entries[idx + 1..]
            .iter()
            .find(|e| e.timestamp > entry.timestamp && e.location != entry.location)
            .map(|e| e.timestamp)
    }

    /// 截至 end_exclusive（不含）的最后一次到达
    pub fn latest_before(&self, end_exclusive: NaiveDateTime) -> Option<&TimelineEntry> {
        self.entries
            .iter()
            .take_while(|e| e.timestamp < end_exclusive)
            .last()
    }

    /// 当前（最终）所在位置
    pub fn final_entry(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }
}

// ==========================================
// MovementEvent - 推断的移动事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEvent {
    pub item_id: String,
    pub location: String,
    pub class: LocationClass,
    pub timestamp: NaiveDateTime,
    pub kind: MovementKind,
}
