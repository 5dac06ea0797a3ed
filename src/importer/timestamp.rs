// ==========================================
// 物流流向对账引擎 - 时间戳解析
// ==========================================
// 职责: 单元格文本 → Option<NaiveDateTime>
// 说明: 解析失败返回 None,由调用方记录诊断,不走错误分支
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};

// 日期时间格式（按顺序尝试）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

// 纯日期格式（时间部分为 00:00:00）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d/%m/%Y", "%d-%m-%Y"];

// 视为空单元格的占位文本
const NULL_TOKENS: &[&str] = &["nan", "nat", "none", "null", "-", "n/a"];

// Excel 序列日期受理区间: 1950-01-01 ..= 2099-12-31（1900 日期系统）
// 区间外的裸数字多为误填的数量,按畸形单元格处理
const EXCEL_SERIAL_MIN: f64 = 18_264.0;
const EXCEL_SERIAL_MAX: f64 = 73_051.0;

/// 判断单元格是否为空（空白或占位文本）
pub fn is_null_cell(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || NULL_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

/// 解析时间戳
///
/// # 支持格式
/// - `%Y-%m-%d %H:%M:%S`（含小数秒）/ `%Y-%m-%d %H:%M` / `%Y-%m-%dT%H:%M:%S`
/// - RFC3339 (例如: 2024-01-01T12:30:00+04:00,取本地时刻)
/// - 纯日期: `%Y-%m-%d` / `%Y/%m/%d` / `%Y%m%d` / `%d/%m/%Y` / `%d-%m-%Y`
/// - Excel 序列日期（如 45366 或 45366.5,仅受理 1950-2099 年）
///
/// # 返回
/// - `Some(NaiveDateTime)`: 解析成功
/// - `None`: 空单元格或无法解析
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if is_null_cell(s) {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    parse_excel_serial(s)
}

/// 解析 Excel 序列日期（1900 日期系统）
fn parse_excel_serial(s: &str) -> Option<NaiveDateTime> {
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let serial: f64 = s.parse().ok()?;
    if !(EXCEL_SERIAL_MIN..EXCEL_SERIAL_MAX).contains(&serial) {
        tracing::debug!(value = s, "数值不在 Excel 序列日期受理区间内");
        return None;
    }

    // 1900 系统的 day 0 对应 1899-12-30（已含闰年缺陷修正）
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(seconds))
}
