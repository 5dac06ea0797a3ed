// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use flow_reconciler::domain::item::ItemRecord;
use flow_reconciler::domain::types::{LocationClass, YearMonth};

/// "YYYY-MM-DD" → 当日 00:00:00
pub fn dt(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

// ==========================================
// ItemRecord 构建器
// ==========================================

pub struct ItemBuilder {
    record: ItemRecord,
}

impl ItemBuilder {
    pub fn new(item_id: &str) -> Self {
        Self {
            record: ItemRecord::new(item_id),
        }
    }

    /// 到达（日期 "YYYY-MM-DD"）
    pub fn at(mut self, location: &str, date: &str) -> Self {
        self.record = self.record.with_arrival(location, dt(date));
        self
    }

    /// 空单元格
    pub fn empty(mut self, location: &str) -> Self {
        self.record = self.record.with_empty(location);
        self
    }

    pub fn status(mut self, class: LocationClass, location: &str) -> Self {
        self.record = self.record.with_status(class, location);
        self
    }

    pub fn build(self) -> ItemRecord {
        self.record
    }
}

/// 批量构建同一路径的货物（C-{prefix}-{n}）
pub fn batch(prefix: &str, count: usize, stops: &[(&str, &str)]) -> Vec<ItemRecord> {
    (0..count)
        .map(|n| {
            stops
                .iter()
                .fold(ItemBuilder::new(&format!("C-{}-{}", prefix, n)), |b, (loc, date)| {
                    b.at(loc, date)
                })
                .build()
        })
        .collect()
}
