// ==========================================
// 物流流向对账引擎 - 引擎编排器
// ==========================================
// 用途: 协调 分类 → 时间线 → 阶段 → 汇总 → 校验 → 建议 的执行顺序
// 说明: 单批次同步执行,每次运行从完整快照重新计算,无跨运行状态
// ==========================================

use crate::config::EngineConfigReader;
use crate::config::stage_policy::FlowStagePolicy;
use crate::domain::diagnostics::{Diagnostics, DiagnosticsSummary};
use crate::domain::item::ItemRecord;
use crate::domain::location::LocationCatalog;
use crate::domain::movement::Timeline;
use crate::domain::report::{
    BalanceReport, BalanceSummary, FlowStageRow, InventoryReconciliation, ModeRecommendation,
    MonthlyAggregate, StructuralViolation,
};
use crate::domain::types::{MonthRange, OperatingMode, YearMonth};
use crate::engine::advisor::FailSafeAdvisor;
use crate::engine::aggregator::{AggregationOutcome, MovementAggregator};
use crate::engine::balance::BalanceValidator;
use crate::engine::classifier::LocationClassifier;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::flow_stage::FlowStageClassifier;
use crate::engine::timeline::TimelineBuilder;
use crate::importer::{RawTable, RecordLoader};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// RunReport - 单次运行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    // 运行元信息
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub policy_version: String,
    pub range: Option<MonthRange>,

    // 流向阶段输出
    pub stage_rows: Vec<FlowStageRow>,

    // 月度汇总输出
    pub aggregates: Vec<MonthlyAggregate>,
    pub inventory_reconciliations: Vec<InventoryReconciliation>,

    // 平衡校验输出
    pub balance_reports: Vec<BalanceReport>,
    pub balance_summary: BalanceSummary,
    pub structural_warnings: Vec<StructuralViolation>,

    // 模式建议
    pub recommendation: ModeRecommendation,

    // 数据质量诊断
    pub diagnostics: Diagnostics,
    pub diagnostics_summary: DiagnosticsSummary,
}

// ==========================================
// ReconciliationEngine - 引擎编排器
// ==========================================
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    loader: RecordLoader,
    classifier: LocationClassifier,
    timeline_builder: TimelineBuilder,
    stage_classifier: FlowStageClassifier,
    aggregator: MovementAggregator,
    validator: BalanceValidator,
    advisor: FailSafeAdvisor,
    default_mode: OperatingMode,
    deadline: Duration,
    range: Option<MonthRange>,
}

impl ReconciliationEngine {
    /// 使用默认口径创建（canonical 策略 / 0.99 阈值 / ZERO 防御模式）
    pub fn new(catalog: LocationCatalog) -> Self {
        Self::assemble(
            RecordLoader::new(catalog.clone()),
            catalog,
            FlowStagePolicy::canonical(),
            BalanceValidator::default(),
            FailSafeAdvisor::default(),
        )
    }

    /// 从配置创建
    pub fn from_config(config: &dyn EngineConfigReader) -> EngineResult<Self> {
        let catalog = config.get_location_catalog()?;
        let threshold = config.get_accuracy_threshold()?;
        let policy = config.get_stage_policy()?;

        let mut engine = Self::assemble(
            RecordLoader::from_config(config)?,
            catalog,
            policy,
            BalanceValidator::new(threshold),
            FailSafeAdvisor::new(threshold, config.get_defensive_mode()?),
        );
        engine.default_mode = config.get_default_mode()?;
        engine.deadline = Duration::from_millis(config.get_batch_deadline_ms()?);

        info!(
            policy = %engine.stage_classifier.policy().version,
            threshold,
            locations = engine.classifier.catalog().len(),
            "对账引擎已按配置初始化"
        );
        Ok(engine)
    }

    fn assemble(
        loader: RecordLoader,
        catalog: LocationCatalog,
        policy: FlowStagePolicy,
        validator: BalanceValidator,
        advisor: FailSafeAdvisor,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let classifier = LocationClassifier::new(catalog.clone());
        let timeline_builder = TimelineBuilder::new(classifier.clone());
        Self {
            loader,
            aggregator: MovementAggregator::new(catalog, timeline_builder.clone()),
            classifier,
            timeline_builder,
            stage_classifier: FlowStageClassifier::new(policy),
            validator,
            advisor,
            default_mode: OperatingMode::Prime,
            deadline: Duration::from_millis(30_000),
            range: None,
        }
    }

    /// 固定月份区间（默认取观测时间戳的覆盖区间）
    pub fn with_range(mut self, range: MonthRange) -> Self {
        self.range = Some(range);
        self
    }

    /// 按起止月份固定区间（闭区间）
    ///
    /// # 错误
    /// - start > end → EngineError::InvalidRange
    pub fn with_months(self, start: YearMonth, end: YearMonth) -> EngineResult<Self> {
        let range = MonthRange::new(start, end).ok_or_else(|| EngineError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        })?;
        Ok(self.with_range(range))
    }

    /// 覆盖批次超时时长
    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_policy(mut self, policy: FlowStagePolicy) -> Self {
        self.stage_classifier = FlowStageClassifier::new(policy);
        self
    }

    pub fn default_mode(&self) -> OperatingMode {
        self.default_mode
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn loader(&self) -> &RecordLoader {
        &self.loader
    }

    /// 加载宽表并执行对账
    ///
    /// # 错误
    /// - 缺主键列 / 无位置列 → EngineError::Import
    pub fn run_table(&self, table: &RawTable, current_mode: OperatingMode) -> EngineResult<RunReport> {
        let outcome = self.loader.load(table)?;
        let mut report = self.run(&outcome.items, current_mode);

        // 加载诊断排在前面
        let mut diagnostics = outcome.diagnostics;
        diagnostics.extend(report.diagnostics);
        report.diagnostics_summary = diagnostics.summary();
        report.diagnostics = diagnostics;
        Ok(report)
    }

    /// 执行完整对账流程
    ///
    /// # 参数
    /// - items: 货物记录（运行期间只读）
    /// - current_mode: 当前运行模式
    #[instrument(skip(self, items), fields(items = items.len(), mode = %current_mode))]
    pub fn run(&self, items: &[ItemRecord], current_mode: OperatingMode) -> RunReport {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, "开始执行对账流程");
        let mut diagnostics = Diagnostics::new();

        // ==========================================
        // 步骤1: 时间线构建（长表分组排序）
        // ==========================================
        debug!("步骤1: 构建事件时间线");
        let timelines = self.timeline_builder.build_all(items, &mut diagnostics);

        // ==========================================
        // 步骤2: 流向阶段判定
        // ==========================================
        debug!("步骤2: 流向阶段判定");
        let direct_flags: Vec<bool> = items
            .iter()
            .map(|item| self.classifier.is_direct_delivery(item))
            .collect();
        let stage_rows =
            self.stage_classifier
                .classify_all(&timelines, &direct_flags, &mut diagnostics);

        // ==========================================
        // 步骤3: 月度汇总
        // ==========================================
        let range = self.range.or_else(|| Self::covering_range(&timelines));
        debug!(range = ?range, "步骤3: 月度汇总");
        let aggregation = match range {
            Some(range) => {
                self.aggregator
                    .aggregate_timelines(items, &timelines, range, &mut diagnostics)
            }
            None => AggregationOutcome::default(),
        };

        // ==========================================
        // 步骤4: 平衡校验
        // ==========================================
        debug!("步骤4: 平衡校验");
        let balance_reports = self
            .validator
            .validate(&aggregation.aggregates, &mut diagnostics);
        let balance_summary = self.validator.summarize(&balance_reports);
        let structural_warnings = self.validator.structural_checks(
            &aggregation.aggregates,
            &aggregation.opening_inventory,
            aggregation.reconciled_month,
            &mut diagnostics,
        );

        // ==========================================
        // 步骤5: 模式建议
        // ==========================================
        debug!("步骤5: 模式建议");
        let recommendation = self
            .advisor
            .recommend(balance_summary.accuracy_ratio, current_mode);

        let diagnostics_summary = diagnostics.summary();
        info!(
            run_id = %run_id,
            stage_rows = stage_rows.len(),
            aggregates = aggregation.aggregates.len(),
            accuracy = balance_summary.accuracy_ratio,
            should_alert = recommendation.should_alert,
            diagnostics = diagnostics_summary.total,
            "对账流程完成"
        );

        RunReport {
            run_id,
            generated_at: Utc::now(),
            policy_version: self.stage_classifier.policy().version.clone(),
            range,
            stage_rows,
            aggregates: aggregation.aggregates,
            inventory_reconciliations: aggregation.reconciliations,
            balance_reports,
            balance_summary,
            structural_warnings,
            recommendation,
            diagnostics,
            diagnostics_summary,
        }
    }

    fn covering_range(timelines: &[Timeline]) -> Option<MonthRange> {
        MonthRange::covering(
            timelines
                .iter()
                .flat_map(|t| t.entries.iter().map(|e| &e.timestamp)),
        )
    }
}

// ==========================================
// 超时包装（整批次）
// ==========================================

/// 在阻塞线程上执行任务,超时即放弃结果
///
/// # 返回
/// - Err(DeadlineExceeded): 超时,不返回任何部分结果
/// - Err(TaskFailed): 执行线程 panic 或被取消
pub async fn with_deadline<F, T>(deadline: Duration, task: F) -> EngineResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(task);
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) => Err(EngineError::TaskFailed(join_err.to_string())),
        Err(_) => {
            tracing::error!(deadline_ms = deadline.as_millis() as u64, "批次超时,结果已丢弃");
            Err(EngineError::DeadlineExceeded {
                deadline_ms: deadline.as_millis() as u64,
            })
        }
    }
}

/// 带超时的对账运行
///
/// # 参数
/// - current_mode: None 时取引擎默认模式（default_mode 配置项）
///
/// 超时时长取引擎配置（batch_deadline_ms）
pub async fn run_with_deadline(
    engine: Arc<ReconciliationEngine>,
    items: Vec<ItemRecord>,
    current_mode: Option<OperatingMode>,
) -> EngineResult<RunReport> {
    let deadline = engine.deadline();
    let mode = current_mode.unwrap_or_else(|| engine.default_mode());
    with_deadline(deadline, move || engine.run(&items, mode)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_run_empty_input() {
        let engine = ReconciliationEngine::new(LocationCatalog::default_network());
        let report = engine.run(&[], OperatingMode::Prime);

        assert!(report.range.is_none());
        assert!(report.aggregates.is_empty());
        assert_eq!(report.balance_summary.accuracy_ratio, 1.0);
        assert!(!report.recommendation.should_alert);
    }

    #[test]
    fn test_range_defaults_to_observed_span() {
        let items = vec![
            ItemRecord::new("C-1").with_arrival("DSV Indoor", ts(1, 10)),
            ItemRecord::new("C-2").with_arrival("MIR", ts(3, 2)),
        ];
        let engine = ReconciliationEngine::new(LocationCatalog::default_network());
        let report = engine.run(&items, OperatingMode::Prime);

        let range = report.range.unwrap();
        assert_eq!(range.months().len(), 3);
        assert_eq!(report.aggregates.len(), 3 * 11);
        assert_eq!(report.stage_rows.len(), 2);
    }

    #[tokio::test]
    async fn test_with_deadline_expires() {
        let result = with_deadline(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(300));
            1
        })
        .await;
        assert!(matches!(
            result,
            Err(EngineError::DeadlineExceeded { deadline_ms: 20 })
        ));
    }

    #[tokio::test]
    async fn test_run_with_deadline_completes() {
        let engine = Arc::new(ReconciliationEngine::new(LocationCatalog::default_network()));
        let items = vec![ItemRecord::new("C-1").with_arrival("MIR", ts(3, 15))];
        let report = run_with_deadline(engine, items, Some(OperatingMode::Lattice))
            .await
            .unwrap();
        assert_eq!(report.stage_rows[0].stage_code, 0);
        assert_eq!(report.recommendation.current_mode, OperatingMode::Lattice);
    }

    #[tokio::test]
    async fn test_run_with_deadline_uses_engine_deadline() {
        let engine = Arc::new(
            ReconciliationEngine::new(LocationCatalog::default_network())
                .with_batch_deadline(Duration::from_secs(7)),
        );
        assert_eq!(engine.deadline(), Duration::from_secs(7));

        let items = vec![ItemRecord::new("C-1").with_arrival("MIR", ts(3, 15))];
        let report = run_with_deadline(engine, items, None).await.unwrap();
        assert_eq!(report.recommendation.current_mode, OperatingMode::Prime);
    }
}
