// ==========================================
// 物流流向对账引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅结构性问题（缺主键列 / 无位置列）为致命错误,
//       单元格级问题记录为诊断,不在此列
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 读取相关错误 =====
    #[error("数据读取失败: {0}")]
    ReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误（致命）=====
    #[error("主键列缺失: 表头中不存在 {column}")]
    MissingIdentifierColumn { column: String },

    #[error("表中不存在任何登记位置列（目录共 {catalog_size} 个位置）")]
    NoLocationColumns { catalog_size: usize },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::ReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
