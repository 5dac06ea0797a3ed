// ==========================================
// 物流流向对账引擎 - 配置层
// ==========================================
// 职责: 系统配置管理（阈值 / 表结构 / 目录 / 阶段策略）
// 存储: global scope 键值表
// ==========================================

pub mod config_manager;
pub mod engine_config_trait;
pub mod error;
pub mod stage_policy;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config_trait::EngineConfigReader;
pub use error::{ConfigError, ConfigResult};
pub use stage_policy::{FlowStagePolicy, StageRule};
