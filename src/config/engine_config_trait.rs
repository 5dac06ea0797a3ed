// ==========================================
// 物流流向对账引擎 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::stage_policy::FlowStagePolicy;
use crate::domain::location::LocationCatalog;
use crate::domain::types::OperatingMode;

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 实现者: ConfigManager（global scope 键值表）
pub trait EngineConfigReader: Send + Sync {
    // ===== 平衡校验与模式建议 =====

    /// 获取对账准确率阈值
    ///
    /// # 默认值
    /// - 0.99
    ///
    /// # 约束
    /// - 取值 (0, 1]
    fn get_accuracy_threshold(&self) -> ConfigResult<f64>;

    /// 获取防御模式（准确率低于阈值时建议切换的模式）
    ///
    /// # 默认值
    /// - ZERO
    fn get_defensive_mode(&self) -> ConfigResult<OperatingMode>;

    /// 获取默认运行模式（调用方未指定当前模式时使用）
    ///
    /// # 默认值
    /// - PRIME
    fn get_default_mode(&self) -> ConfigResult<OperatingMode>;

    // ===== 输入表结构 =====

    /// 获取主键列名
    ///
    /// # 默认值
    /// - "Case No."
    fn get_id_column(&self) -> ConfigResult<String>;

    /// 获取状态快照类别列名
    ///
    /// # 默认值
    /// - "Status_Current"
    fn get_status_class_column(&self) -> ConfigResult<String>;

    /// 获取状态快照位置列名
    ///
    /// # 默认值
    /// - "Status_Location"
    fn get_status_location_column(&self) -> ConfigResult<String>;

    /// 获取忽略列（非位置列,不计入未登记位置诊断）
    ///
    /// # 默认值
    /// - 空
    fn get_ignored_columns(&self) -> ConfigResult<Vec<String>>;

    // ===== 位置目录与阶段策略 =====

    /// 获取位置目录
    ///
    /// # 默认值
    /// - HVDC 项目网络（6 仓库 + MOSB + 4 现场）
    ///
    /// # 错误
    /// - 目录为空 → ConfigError::EmptyCatalog
    fn get_location_catalog(&self) -> ConfigResult<LocationCatalog>;

    /// 获取流向阶段策略表
    ///
    /// # 默认值
    /// - FlowStagePolicy::canonical()（v1）
    fn get_stage_policy(&self) -> ConfigResult<FlowStagePolicy>;

    // ===== 运行控制 =====

    /// 获取整批次超时（毫秒）
    ///
    /// # 默认值
    /// - 30000
    fn get_batch_deadline_ms(&self) -> ConfigResult<u64>;
}
