// ==========================================
// 物流流向对账引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存键值表 (global scope),可由 JSON 对象/文件加载
// ==========================================

use crate::config::engine_config_trait::EngineConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::stage_policy::FlowStagePolicy;
use crate::domain::location::{CatalogEntry, LocationCatalog};
use crate::domain::types::OperatingMode;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象加载
    ///
    /// # 规则
    /// - 字符串值原样保存
    /// - 数值/布尔/数组/对象按 JSON 文本保存（如目录、策略表）
    /// - null 视为未配置
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let parsed: Value = serde_json::from_str(raw)?;
        let object = parsed
            .as_object()
            .ok_or_else(|| ConfigError::ParseError("配置根节点必须是 JSON 对象".to_string()))?;

        let mut values = HashMap::with_capacity(object.len());
        for (key, value) in object {
            match value {
                Value::Null => continue,
                Value::String(s) => {
                    values.insert(key.clone(), s.clone());
                }
                other => {
                    values.insert(key.clone(), other.to_string());
                }
            }
        }

        tracing::debug!(keys = values.len(), "配置已加载");
        Ok(Self { values })
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// 覆写单个配置项
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// 获取所有配置的快照（JSON格式,按键排序）
    ///
    /// # 用途
    /// - 随运行报告输出,保证结果可复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let sorted: BTreeMap<&String, &String> = self.values.iter().collect();
        Ok(serde_json::to_string(&sorted)?)
    }

    fn get_config_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
    }

    fn invalid(key: &str, value: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    fn get_mode(&self, key: &str, default: &str) -> ConfigResult<OperatingMode> {
        let value = self.get_config_or_default(key, default);
        OperatingMode::from_str(value).ok_or_else(|| Self::invalid(key, value, "未知运行模式"))
    }
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
impl EngineConfigReader for ConfigManager {
    // ===== 平衡校验与模式建议 =====

    fn get_accuracy_threshold(&self) -> ConfigResult<f64> {
        let key = config_keys::ACCURACY_THRESHOLD;
        let value = self.get_config_or_default(key, "0.99");
        let threshold: f64 = value
            .parse()
            .map_err(|_| Self::invalid(key, value, "无法解析为浮点数"))?;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Self::invalid(key, value, "阈值必须在 (0, 1] 范围内"));
        }
        Ok(threshold)
    }

    fn get_defensive_mode(&self) -> ConfigResult<OperatingMode> {
        self.get_mode(config_keys::DEFENSIVE_MODE, "ZERO")
    }

    fn get_default_mode(&self) -> ConfigResult<OperatingMode> {
        self.get_mode(config_keys::DEFAULT_MODE, "PRIME")
    }

    // ===== 输入表结构 =====

    fn get_id_column(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_or_default(config_keys::ID_COLUMN, "Case No.")
            .to_string())
    }

    fn get_status_class_column(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_or_default(config_keys::STATUS_CLASS_COLUMN, "Status_Current")
            .to_string())
    }

    fn get_status_location_column(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_or_default(config_keys::STATUS_LOCATION_COLUMN, "Status_Location")
            .to_string())
    }

    fn get_ignored_columns(&self) -> ConfigResult<Vec<String>> {
        let value = self.get_config_or_default(config_keys::IGNORED_COLUMNS, "");
        Ok(value
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect())
    }

    // ===== 位置目录与阶段策略 =====

    fn get_location_catalog(&self) -> ConfigResult<LocationCatalog> {
        let key = config_keys::LOCATION_CATALOG;
        let Some(value) = self.values.get(key) else {
            return Ok(LocationCatalog::default_network());
        };

        let entries: Vec<CatalogEntry> = serde_json::from_str(value)
            .map_err(|e| Self::invalid(key, value, format!("目录 JSON 格式错误: {}", e)))?;
        if entries.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        LocationCatalog::from_entries(entries).map_err(|msg| Self::invalid(key, value, msg))
    }

    fn get_stage_policy(&self) -> ConfigResult<FlowStagePolicy> {
        let key = config_keys::STAGE_POLICY;
        let Some(value) = self.values.get(key) else {
            return Ok(FlowStagePolicy::canonical());
        };

        let policy: FlowStagePolicy = serde_json::from_str(value)
            .map_err(|e| Self::invalid(key, value, format!("策略 JSON 格式错误: {}", e)))?;
        policy
            .validate()
            .map_err(|msg| Self::invalid(key, value, msg))?;
        Ok(policy)
    }

    // ===== 运行控制 =====

    fn get_batch_deadline_ms(&self) -> ConfigResult<u64> {
        let key = config_keys::BATCH_DEADLINE_MS;
        let value = self.get_config_or_default(key, "30000");
        value
            .parse::<u64>()
            .map_err(|_| Self::invalid(key, value, "无法解析为毫秒数"))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 平衡校验 / 模式建议
    pub const ACCURACY_THRESHOLD: &str = "accuracy_threshold";
    pub const DEFENSIVE_MODE: &str = "defensive_mode";
    pub const DEFAULT_MODE: &str = "default_mode";

    // 输入表结构
    pub const ID_COLUMN: &str = "id_column";
    pub const STATUS_CLASS_COLUMN: &str = "status_class_column";
    pub const STATUS_LOCATION_COLUMN: &str = "status_location_column";
    pub const IGNORED_COLUMNS: &str = "ignored_columns"; // 逗号分隔

    // 目录与策略 (JSON)
    pub const LOCATION_CATALOG: &str = "location_catalog";
    pub const STAGE_POLICY: &str = "stage_policy";

    // 运行控制
    pub const BATCH_DEADLINE_MS: &str = "batch_deadline_ms";
}
