// ==========================================
// 物流流向对账引擎 - 领域类型定义
// ==========================================
// 职责: 位置类别 / 流向阶段 / 运行模式 / 月份口径
// 红线: 纯类型定义,不含聚合逻辑
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 位置类别 (Location Class)
// ==========================================
// 顺序即路径等级: Warehouse < Hub < Site
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationClass {
    Warehouse, // 仓库
    Hub,       // 中转枢纽（如 MOSB）
    Site,      // 现场
    Unknown,   // 未登记位置
}

impl LocationClass {
    /// 路径等级（用于单调性检查，Unknown 无等级）
    pub fn path_rank(&self) -> Option<u8> {
        match self {
            LocationClass::Warehouse => Some(1),
            LocationClass::Hub => Some(2),
            LocationClass::Site => Some(3),
            LocationClass::Unknown => None,
        }
    }

    /// 从字符串解析类别（宽松匹配，用于状态快照列）
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "WAREHOUSE" | "WH" => LocationClass::Warehouse,
            "HUB" | "OFFSHORE" | "MOSB" => LocationClass::Hub,
            "SITE" => LocationClass::Site,
            _ => LocationClass::Unknown,
        }
    }

    /// 转换为存储字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationClass::Warehouse => "WAREHOUSE",
            LocationClass::Hub => "HUB",
            LocationClass::Site => "SITE",
            LocationClass::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for LocationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 流向阶段 (Flow Stage)
// ==========================================
// 等级制: 0-4,数值越大路径越复杂
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStage {
    PreArrival,      // 0: 未入库 / 直送现场
    SingleWarehouse, // 1: 单仓
    TwoWarehouse,    // 2: 双仓
    HubRouted,       // 3: 经枢纽
    MultiHop,        // 4: 多跳
}

impl FlowStage {
    pub fn code(&self) -> u8 {
        match self {
            FlowStage::PreArrival => 0,
            FlowStage::SingleWarehouse => 1,
            FlowStage::TwoWarehouse => 2,
            FlowStage::HubRouted => 3,
            FlowStage::MultiHop => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlowStage::PreArrival),
            1 => Some(FlowStage::SingleWarehouse),
            2 => Some(FlowStage::TwoWarehouse),
            3 => Some(FlowStage::HubRouted),
            4 => Some(FlowStage::MultiHop),
            _ => None,
        }
    }

    /// 报表标签
    pub fn label(&self) -> &'static str {
        match self {
            FlowStage::PreArrival => "Pre Arrival",
            FlowStage::SingleWarehouse => "Single Warehouse",
            FlowStage::TwoWarehouse => "Two Warehouse",
            FlowStage::HubRouted => "Hub Routed",
            FlowStage::MultiHop => "Multi Hop",
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 移动事件类型 (Movement Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Arrival,   // 到达
    Departure, // 离开（推断）
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Arrival => write!(f, "ARRIVAL"),
            MovementKind::Departure => write!(f, "DEPARTURE"),
        }
    }
}

// ==========================================
// 运行模式 (Operating Mode)
// ==========================================
// ZERO 为默认防御模式（Fail-safe）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingMode {
    Prime,
    Oracle,
    Lattice,
    Rhythm,
    CostGuard,
    Zero,
}

impl OperatingMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "PRIME" => Some(OperatingMode::Prime),
            "ORACLE" => Some(OperatingMode::Oracle),
            "LATTICE" => Some(OperatingMode::Lattice),
            "RHYTHM" => Some(OperatingMode::Rhythm),
            "COST_GUARD" => Some(OperatingMode::CostGuard),
            "ZERO" => Some(OperatingMode::Zero),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Prime => "PRIME",
            OperatingMode::Oracle => "ORACLE",
            OperatingMode::Lattice => "LATTICE",
            OperatingMode::Rhythm => "RHYTHM",
            OperatingMode::CostGuard => "COST_GUARD",
            OperatingMode::Zero => "ZERO",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 自然月 (YearMonth)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32, // 1-12
}

// 年份有效区间（与 Excel 日期上限一致）
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

impl YearMonth {
    /// 构造（月份越界或年份不在 1..=9999 返回 None）
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (MIN_YEAR..=MAX_YEAR).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 时间戳所在月份
    pub fn of(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    pub fn checked_next(&self) -> Option<Self> {
        if self.month == 12 {
            Some(Self {
                year: self.year.checked_add(1)?,
                month: 1,
            })
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    pub fn checked_prev(&self) -> Option<Self> {
        if self.month == 1 {
            Some(Self {
                year: self.year.checked_sub(1)?,
                month: 12,
            })
        } else {
            Some(Self {
                year: self.year,
                month: self.month - 1,
            })
        }
    }

    /// 下一个月（i32 年份上限处保持不变）
    pub fn next(&self) -> Self {
        self.checked_next().unwrap_or(*self)
    }

    /// 上一个月（i32 年份下限处保持不变）
    pub fn prev(&self) -> Self {
        self.checked_prev().unwrap_or(*self)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// 下月 1 日 00:00:00（月末判定口径: ts < end_exclusive）
    pub fn end_exclusive(&self) -> Option<NaiveDateTime> {
        self.checked_next()?
            .first_day()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// 从 "YYYY-MM" 解析
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ==========================================
// 月份区间 (MonthRange) - 闭区间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl MonthRange {
    /// 构造（start > end 返回 None）
    pub fn new(start: YearMonth, end: YearMonth) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn single(month: YearMonth) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.start <= month && month <= self.end
    }

    /// 区间内全部月份（升序）
    pub fn months(&self) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut cur = self.start;
        while cur <= self.end {
            months.push(cur);
            match cur.checked_next() {
                Some(next) if cur != self.end => cur = next,
                _ => break,
            }
        }
        months
    }

    /// 覆盖全部时间戳的最小区间（无时间戳返回 None）
    pub fn covering<'a, I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a NaiveDateTime>,
    {
        let mut bounds: Option<(YearMonth, YearMonth)> = None;
        for ts in timestamps {
            let m = YearMonth::of(ts);
            bounds = Some(match bounds {
                None => (m, m),
                Some((lo, hi)) => (lo.min(m), hi.max(m)),
            });
        }
        bounds.map(|(start, end)| Self { start, end })
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_rollover() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2024, 1).unwrap());
        assert_eq!(YearMonth::new(2024, 1).unwrap().prev(), dec);
        assert_eq!(dec.to_string(), "2023-12");
        assert!(YearMonth::new(2024, 13).is_none());
    }

    #[test]
    fn test_year_month_bounds() {
        assert!(YearMonth::new(i32::MAX, 12).is_none());
        assert!(YearMonth::new(0, 1).is_none());

        let last = YearMonth::new(9999, 12).unwrap();
        let range = MonthRange::new(YearMonth::new(9999, 11).unwrap(), last).unwrap();
        assert_eq!(range.months().len(), 2);

        // 直接构造的极值月份不溢出
        let edge = YearMonth { year: i32::MAX, month: 12 };
        assert_eq!(edge.checked_next(), None);
        assert_eq!(edge.next(), edge);
        assert_eq!(MonthRange::single(edge).months(), vec![edge]);
    }

    #[test]
    fn test_year_month_parse() {
        assert_eq!(YearMonth::parse("2024-03"), YearMonth::new(2024, 3));
        assert_eq!(YearMonth::parse("2024-3"), YearMonth::new(2024, 3));
        assert!(YearMonth::parse("202403").is_none());
    }

    #[test]
    fn test_month_range_months() {
        let range = MonthRange::new(
            YearMonth::new(2023, 11).unwrap(),
            YearMonth::new(2024, 2).unwrap(),
        )
        .unwrap();
        let months: Vec<String> = range.months().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);

        assert!(MonthRange::new(
            YearMonth::new(2024, 2).unwrap(),
            YearMonth::new(2024, 1).unwrap()
        )
        .is_none());
    }

    #[test]
    fn test_month_range_covering() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let range = MonthRange::covering([&a, &b]).unwrap();
        assert_eq!(range.start, YearMonth::new(2024, 1).unwrap());
        assert_eq!(range.end, YearMonth::new(2024, 3).unwrap());
        assert!(MonthRange::covering(std::iter::empty()).is_none());
    }

    #[test]
    fn test_flow_stage_codes() {
        for code in 0..=4u8 {
            assert_eq!(FlowStage::from_code(code).unwrap().code(), code);
        }
        assert!(FlowStage::from_code(5).is_none());
        assert_eq!(FlowStage::HubRouted.label(), "Hub Routed");
    }

    #[test]
    fn test_operating_mode_parse() {
        assert_eq!(OperatingMode::from_str("cost-guard"), Some(OperatingMode::CostGuard));
        assert_eq!(OperatingMode::from_str(" zero "), Some(OperatingMode::Zero));
        assert_eq!(OperatingMode::from_str("turbo"), None);
    }
}
