// ==========================================
// 物流流向对账引擎 - 流向阶段分类器
// ==========================================
// 职责: 时间线 → 流向阶段（0-4）
// 输入: Timeline + FlowStagePolicy（版本化规则表）
// 输出: FlowStageRow
// 红线: 任何货物都有阶段,未命中规则/仅未登记位置均落 Stage 0 并记录诊断
// ==========================================

use crate::config::stage_policy::FlowStagePolicy;
use crate::domain::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::domain::movement::Timeline;
use crate::domain::report::FlowStageRow;
use crate::domain::types::FlowStage;
use tracing::instrument;

// ==========================================
// FlowStageClassifier - 流向阶段分类器
// ==========================================
#[derive(Debug, Clone)]
pub struct FlowStageClassifier {
    policy: FlowStagePolicy,
}

impl FlowStageClassifier {
    pub fn new(policy: FlowStagePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FlowStagePolicy {
        &self.policy
    }

    /// 判定单件货物的流向阶段
    ///
    /// # 参数
    /// - timeline: 该货物的时间线
    /// - direct_delivery: 是否直送现场（仅用于输出标记）
    /// - diagnostics: 诊断收集器
    pub fn classify(
        &self,
        timeline: &Timeline,
        direct_delivery: bool,
        diagnostics: &mut Diagnostics,
    ) -> FlowStageRow {
        let warehouses = timeline.warehouses_visited();
        let hub = timeline.visits_hub();
        let mut note = None;

        let stage = match self.policy.stage_for(warehouses, hub) {
            Some(stage) => stage,
            None => {
                let message = format!(
                    "策略 {} 未覆盖 w={}, h={},按 Stage 0 处理",
                    self.policy.version,
                    warehouses,
                    u8::from(hub)
                );
                diagnostics.push(
                    Diagnostic::warning(DiagnosticKind::StagePolicyGap, message.clone())
                        .for_item(&timeline.item_id),
                );
                note = Some(message);
                FlowStage::PreArrival
            }
        };

        if timeline.has_only_unknown() {
            let message = format!(
                "仅有未登记位置的到达: {}",
                timeline.unknown_locations.join(", ")
            );
            diagnostics.push(
                Diagnostic::warning(DiagnosticKind::UnknownOnlyArrivals, message.clone())
                    .for_item(&timeline.item_id),
            );
            note = Some(message);
        }

        FlowStageRow {
            item_id: timeline.item_id.clone(),
            stage,
            stage_code: stage.code(),
            label: stage.label().to_string(),
            direct_delivery,
            note,
        }
    }

    /// 批量判定（逐件独立）
    #[instrument(skip_all, fields(items = timelines.len(), policy = %self.policy.version))]
    pub fn classify_all(
        &self,
        timelines: &[Timeline],
        direct_flags: &[bool],
        diagnostics: &mut Diagnostics,
    ) -> Vec<FlowStageRow> {
        timelines
            .iter()
            .enumerate()
            .map(|(idx, timeline)| {
                let direct = direct_flags.get(idx).copied().unwrap_or(false);
                self.classify(timeline, direct, diagnostics)
            })
            .collect()
    }
}

impl Default for FlowStageClassifier {
    fn default() -> Self {
        Self::new(FlowStagePolicy::canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::movement::TimelineEntry;
    use crate::domain::types::LocationClass;
    use chrono::NaiveDate;

    fn timeline(stops: &[(&str, LocationClass)]) -> Timeline {
        let entries = stops
            .iter()
            .enumerate()
            .map(|(i, (name, class))| TimelineEntry {
                location: name.to_string(),
                class: *class,
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                catalog_order: i,
            })
            .collect();
        Timeline {
            item_id: "C-1".to_string(),
            entries,
            flags: Vec::new(),
            unknown_locations: Vec::new(),
        }
    }

    fn stage_of(stops: &[(&str, LocationClass)]) -> FlowStage {
        FlowStageClassifier::default()
            .classify(&timeline(stops), false, &mut Diagnostics::new())
            .stage
    }

    #[test]
    fn test_canonical_stages() {
        use LocationClass::*;
        assert_eq!(stage_of(&[]), FlowStage::PreArrival);
        assert_eq!(stage_of(&[("MIR", Site)]), FlowStage::PreArrival);
        assert_eq!(stage_of(&[("W1", Warehouse), ("MIR", Site)]), FlowStage::SingleWarehouse);
        assert_eq!(
            stage_of(&[("W1", Warehouse), ("W2", Warehouse)]),
            FlowStage::TwoWarehouse
        );
        assert_eq!(stage_of(&[("MOSB", Hub), ("DAS", Site)]), FlowStage::HubRouted);
        assert_eq!(
            stage_of(&[("W1", Warehouse), ("MOSB", Hub), ("DAS", Site)]),
            FlowStage::HubRouted
        );
        assert_eq!(
            stage_of(&[("W1", Warehouse), ("W2", Warehouse), ("MOSB", Hub)]),
            FlowStage::MultiHop
        );
        assert_eq!(
            stage_of(&[("W1", Warehouse), ("W2", Warehouse), ("W3", Warehouse)]),
            FlowStage::MultiHop
        );
    }

    #[test]
    fn test_row_fields() {
        let row = FlowStageClassifier::default().classify(
            &timeline(&[("MOSB", LocationClass::Hub)]),
            false,
            &mut Diagnostics::new(),
        );
        assert_eq!(row.stage_code, 3);
        assert_eq!(row.label, FlowStage::HubRouted.label());
        assert!(row.note.is_none());
    }

    #[test]
    fn test_unknown_only_is_stage_zero_with_note() {
        let mut t = timeline(&[]);
        t.unknown_locations = vec!["Jetty".to_string()];
        let mut diags = Diagnostics::new();
        let row = FlowStageClassifier::default().classify(&t, false, &mut diags);

        assert_eq!(row.stage, FlowStage::PreArrival);
        assert!(row.note.as_deref().unwrap().contains("Jetty"));
        assert_eq!(diags.count_of(DiagnosticKind::UnknownOnlyArrivals), 1);
    }
}
