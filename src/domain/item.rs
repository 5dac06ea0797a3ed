// ==========================================
// 物流流向对账引擎 - 货物记录领域模型
// ==========================================
// 用途: 导入层写入,引擎层只读（运行期间不可变）
// ==========================================

use crate::domain::types::LocationClass;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// CurrentStatus - 当前位置快照
// ==========================================
// 独立上报的"当前所在位置",与时间线推断结果可能不一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStatus {
    pub class: LocationClass, // 上报的位置类别
    pub location: String,     // 上报的位置名称
}

// ==========================================
// ItemRecord - 货物记录（宽表一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    // ===== 主键 =====
    pub item_id: String, // 货物唯一标识（Case No.）

    // ===== 位置时间戳 =====
    // location -> 到达时间（None = 单元格为空）
    pub locations: BTreeMap<String, Option<NaiveDateTime>>,

    // ===== 当前状态快照（每件至多一个）=====
    pub current_status: Option<CurrentStatus>,

    // ===== 元信息 =====
    pub row_number: usize, // 原始表行号（用于诊断定位,0 = 非表格来源）
}

impl ItemRecord {
    pub fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            locations: BTreeMap::new(),
            current_status: None,
            row_number: 0,
        }
    }

    /// 记录一次到达
    pub fn with_arrival(mut self, location: &str, ts: NaiveDateTime) -> Self {
        self.locations.insert(location.to_string(), Some(ts));
        self
    }

    /// 记录一个空单元格
    pub fn with_empty(mut self, location: &str) -> Self {
        self.locations.insert(location.to_string(), None);
        self
    }

    /// 设置当前状态快照
    pub fn with_status(mut self, class: LocationClass, location: &str) -> Self {
        self.current_status = Some(CurrentStatus {
            class,
            location: location.to_string(),
        });
        self
    }

    pub fn with_row_number(mut self, row_number: usize) -> Self {
        self.row_number = row_number;
        self
    }

    /// 非空单元格（location, timestamp）
    pub fn observed(&self) -> impl Iterator<Item = (&str, &NaiveDateTime)> {
        self.locations
            .iter()
            .filter_map(|(name, ts)| ts.as_ref().map(|t| (name.as_str(), t)))
    }

    /// 非空单元格数量
    pub fn observed_count(&self) -> usize {
        self.observed().count()
    }
}
