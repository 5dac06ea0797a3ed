use crate::domain::types::FlowStage;
use serde::{Deserialize, Serialize};

/// 流向阶段判定规则（单条）
///
/// 匹配条件：`min_warehouses <= w <= max_warehouses` 且 `hub == h`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRule {
    /// 到访仓库数下限（含）
    pub min_warehouses: usize,

    /// 到访仓库数上限（含，None = 不设上限）
    #[serde(default)]
    pub max_warehouses: Option<usize>,

    /// 是否经过枢纽
    pub hub: bool,

    /// 判定结果
    pub stage: FlowStage,
}

impl StageRule {
    pub fn matches(&self, warehouses: usize, hub: bool) -> bool {
        self.hub == hub
            && warehouses >= self.min_warehouses
            && self.max_warehouses.map_or(true, |max| warehouses <= max)
    }
}

/// 流向阶段策略表（版本化）
///
/// 存储位置：ConfigManager 内存配置（global 作用域，key='stage_policy'，JSON）
/// 规则按顺序匹配，先命中者生效；口径变体通过配置切换，不重复实现。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStagePolicy {
    /// 策略版本
    pub version: String,

    /// 说明（可选）
    #[serde(default)]
    pub description: Option<String>,

    /// 规则表
    pub rules: Vec<StageRule>,
}

impl FlowStagePolicy {
    pub const CANONICAL_VERSION: &'static str = "v1";

    /// 标准口径 v1
    ///
    /// | w     | h | stage |
    /// |-------|---|-------|
    /// | 0     | 0 | 0     |
    /// | 1     | 0 | 1     |
    /// | 2     | 0 | 2     |
    /// | ≥3    | 0 | 4     |
    /// | ≤1    | 1 | 3     |
    /// | ≥2    | 1 | 4     |
    pub fn canonical() -> Self {
        let rule = |min, max, hub, stage| StageRule {
            min_warehouses: min,
            max_warehouses: max,
            hub,
            stage,
        };

        Self {
            version: Self::CANONICAL_VERSION.to_string(),
            description: Some("仓库数 × 是否经枢纽 → 阶段".to_string()),
            rules: vec![
                rule(0, Some(0), false, FlowStage::PreArrival),
                rule(1, Some(1), false, FlowStage::SingleWarehouse),
                rule(2, Some(2), false, FlowStage::TwoWarehouse),
                rule(3, None, false, FlowStage::MultiHop),
                rule(0, Some(1), true, FlowStage::HubRouted),
                rule(2, None, true, FlowStage::MultiHop),
            ],
        }
    }

    /// 按规则表判定（未命中返回 None）
    pub fn stage_for(&self, warehouses: usize, hub: bool) -> Option<FlowStage> {
        self.rules
            .iter()
            .find(|r| r.matches(warehouses, hub))
            .map(|r| r.stage)
    }

    /// 校验策略表完整性
    ///
    /// # 校验规则
    /// 1. 版本号不能为空
    /// 2. 规则表不能为空
    /// 3. 上下限不能倒置
    /// 4. 对任意 (w, h) 必须有规则命中（检查到所有边界 + 1）
    pub fn validate(&self) -> Result<(), String> {
        if self.version.trim().is_empty() {
            return Err("策略版本不能为空".to_string());
        }
        if self.rules.is_empty() {
            return Err(format!("策略 {} 规则表为空", self.version));
        }

        let mut horizon = 0usize;
        for (i, rule) in self.rules.iter().enumerate() {
            if let Some(max) = rule.max_warehouses {
                if max < rule.min_warehouses {
                    return Err(format!(
                        "策略 {} 第 {} 条规则上下限倒置: {} > {}",
                        self.version,
                        i + 1,
                        rule.min_warehouses,
                        max
                    ));
                }
                horizon = horizon.max(max);
            }
            horizon = horizon.max(rule.min_warehouses);
        }

        for hub in [false, true] {
            for w in 0..=horizon + 1 {
                if self.stage_for(w, hub).is_none() {
                    return Err(format!(
                        "策略 {} 未覆盖 w={}, h={}",
                        self.version,
                        w,
                        u8::from(hub)
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for FlowStagePolicy {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_table() {
        let policy = FlowStagePolicy::canonical();
        assert!(policy.validate().is_ok());

        assert_eq!(policy.stage_for(0, false), Some(FlowStage::PreArrival));
        assert_eq!(policy.stage_for(1, false), Some(FlowStage::SingleWarehouse));
        assert_eq!(policy.stage_for(2, false), Some(FlowStage::TwoWarehouse));
        assert_eq!(policy.stage_for(3, false), Some(FlowStage::MultiHop));
        assert_eq!(policy.stage_for(7, false), Some(FlowStage::MultiHop));
        assert_eq!(policy.stage_for(0, true), Some(FlowStage::HubRouted));
        assert_eq!(policy.stage_for(1, true), Some(FlowStage::HubRouted));
        assert_eq!(policy.stage_for(2, true), Some(FlowStage::MultiHop));
    }

    #[test]
    fn test_validate_detects_gap() {
        let mut policy = FlowStagePolicy::canonical();
        policy.version = "gap".to_string();
        policy.rules.retain(|r| !(r.hub && r.min_warehouses == 0));

        let err = policy.validate().unwrap_err();
        assert!(err.contains("w=0"));
    }

    #[test]
    fn test_validate_detects_inverted_bounds() {
        let policy = FlowStagePolicy {
            version: "bad".to_string(),
            description: None,
            rules: vec![StageRule {
                min_warehouses: 2,
                max_warehouses: Some(1),
                hub: false,
                stage: FlowStage::TwoWarehouse,
            }],
        };
        assert!(policy.validate().unwrap_err().contains("倒置"));
    }

    #[test]
    fn test_policy_json_variant() {
        // 变体: 单仓 + 枢纽 视为 Stage 2
        let json = r#"{
            "version": "v1-alt",
            "rules": [
                {"min_warehouses": 0, "max_warehouses": 0, "hub": false, "stage": "PRE_ARRIVAL"},
                {"min_warehouses": 1, "max_warehouses": 1, "hub": false, "stage": "SINGLE_WAREHOUSE"},
                {"min_warehouses": 2, "hub": false, "stage": "TWO_WAREHOUSE"},
                {"min_warehouses": 1, "max_warehouses": 1, "hub": true, "stage": "TWO_WAREHOUSE"},
                {"min_warehouses": 0, "hub": true, "stage": "HUB_ROUTED"}
            ]
        }"#;
        let policy: FlowStagePolicy = serde_json::from_str(json).unwrap();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.stage_for(1, true), Some(FlowStage::TwoWarehouse));
        assert_eq!(policy.stage_for(3, true), Some(FlowStage::HubRouted));
    }
}
