// ==========================================
// 物流流向对账引擎 - 失效保护模式建议器
// ==========================================
// 职责: 准确率 → 运行模式建议
// 红线: 只给建议,不切换模式,不发送告警（由调用方决定）
// ==========================================

use crate::domain::report::ModeRecommendation;
use crate::domain::types::OperatingMode;
use crate::engine::balance::DEFAULT_ACCURACY_THRESHOLD;

// ==========================================
// FailSafeAdvisor - 失效保护模式建议器
// ==========================================
#[derive(Debug, Clone)]
pub struct FailSafeAdvisor {
    threshold: f64,
    defensive_mode: OperatingMode,
}

impl FailSafeAdvisor {
    pub fn new(threshold: f64, defensive_mode: OperatingMode) -> Self {
        Self {
            threshold,
            defensive_mode,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn defensive_mode(&self) -> OperatingMode {
        self.defensive_mode
    }

    /// 生成模式建议
    ///
    /// # 规则
    /// - accuracy < threshold: 建议防御模式,需要告警
    /// - 否则: 维持当前模式,无需告警
    /// - 非有限数（NaN / ∞）按 0.0 处理
    pub fn recommend(&self, accuracy_ratio: f64, current_mode: OperatingMode) -> ModeRecommendation {
        let accuracy = if accuracy_ratio.is_finite() {
            accuracy_ratio
        } else {
            0.0
        };

        if accuracy < self.threshold {
            let reason = if current_mode == self.defensive_mode {
                format!(
                    "准确率 {:.4} 低于阈值 {:.4},已处于防御模式 {},维持并告警",
                    accuracy, self.threshold, self.defensive_mode
                )
            } else {
                format!(
                    "准确率 {:.4} 低于阈值 {:.4},建议由 {} 切换至防御模式 {}",
                    accuracy, self.threshold, current_mode, self.defensive_mode
                )
            };
            tracing::warn!(
                accuracy,
                threshold = self.threshold,
                current_mode = %current_mode,
                recommended_mode = %self.defensive_mode,
                "准确率低于阈值"
            );
            return ModeRecommendation {
                current_mode,
                recommended_mode: self.defensive_mode,
                reason,
                accuracy,
                threshold: self.threshold,
                should_alert: true,
            };
        }

        ModeRecommendation {
            current_mode,
            recommended_mode: current_mode,
            reason: format!(
                "准确率 {:.4} 达到阈值 {:.4},维持 {}",
                accuracy, self.threshold, current_mode
            ),
            accuracy,
            threshold: self.threshold,
            should_alert: false,
        }
    }
}

impl Default for FailSafeAdvisor {
    fn default() -> Self {
        Self::new(DEFAULT_ACCURACY_THRESHOLD, OperatingMode::Zero)
    }
}
