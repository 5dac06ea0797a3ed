// ==========================================
// 物流流向对账引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 包装导入层/配置层错误,并补充运行控制错误
// ==========================================

use crate::config::error::ConfigError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("月份区间无效: {start} > {end}")]
    InvalidRange { start: String, end: String },

    #[error("批次超时: 超过 {deadline_ms} ms,未产生任何结果")]
    DeadlineExceeded { deadline_ms: u64 },

    #[error("批次执行线程异常: {0}")]
    TaskFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
