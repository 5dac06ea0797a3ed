// ==========================================
// 物流流向对账引擎 - 导入层
// ==========================================
// 职责: 外部宽表 → 货物记录（ItemRecord）
// 支持: CSV 读取流, 已解析的行映射
// ==========================================

// 模块声明
pub mod error;
pub mod record_loader;
pub mod table;
pub mod timestamp;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use record_loader::{LoadOutcome, RecordLoader};
pub use table::{RawRow, RawTable};
pub use timestamp::{is_null_cell, parse_timestamp};
