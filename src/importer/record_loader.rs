// ==========================================
// 物流流向对账引擎 - 货物记录加载器
// ==========================================
// 职责: 原始宽表 → ItemRecord 列表（只做映射,不做推断）
// 流程: 表头校验 → 列分类 → 逐行映射 → 主键检查 → 状态快照校验
// 红线: 单元格级问题只记诊断,不中断;任何行不得被静默丢弃
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::EngineConfigReader;
use crate::domain::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::domain::item::{CurrentStatus, ItemRecord};
use crate::domain::location::LocationCatalog;
use crate::domain::types::LocationClass;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::table::{RawRow, RawTable};
use crate::importer::timestamp::{is_null_cell, parse_timestamp};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

// ==========================================
// LoadOutcome - 加载结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub items: Vec<ItemRecord>,
    pub diagnostics: Diagnostics,
    pub unknown_columns: Vec<String>, // 未登记位置列（按表头顺序）
}

// 列分类结果
struct ColumnLayout<'a> {
    catalog_columns: Vec<&'a str>,
    unknown_columns: Vec<&'a str>,
    has_status_class: bool,
    has_status_location: bool,
}

// ==========================================
// RecordLoader - 货物记录加载器
// ==========================================
#[derive(Debug, Clone)]
pub struct RecordLoader {
    catalog: LocationCatalog,
    id_column: String,
    status_class_column: String,
    status_location_column: String,
    ignored_columns: HashSet<String>,
}

impl RecordLoader {
    /// 使用默认列名创建
    pub fn new(catalog: LocationCatalog) -> Self {
        Self {
            catalog,
            id_column: "Case No.".to_string(),
            status_class_column: "Status_Current".to_string(),
            status_location_column: "Status_Location".to_string(),
            ignored_columns: HashSet::new(),
        }
    }

    /// 从配置创建
    pub fn from_config(config: &dyn EngineConfigReader) -> ConfigResult<Self> {
        Ok(Self {
            catalog: config.get_location_catalog()?,
            id_column: config.get_id_column()?,
            status_class_column: config.get_status_class_column()?,
            status_location_column: config.get_status_location_column()?,
            ignored_columns: config.get_ignored_columns()?.into_iter().collect(),
        })
    }

    pub fn with_id_column(mut self, column: &str) -> Self {
        self.id_column = column.trim().to_string();
        self
    }

    pub fn with_ignored_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    /// 加载原始宽表
    ///
    /// # 返回
    /// - Ok(LoadOutcome): 货物记录 + 诊断
    /// - Err(MissingIdentifierColumn): 表头中无主键列
    /// - Err(NoLocationColumns): 表头中无任何登记位置列
    #[instrument(skip_all, fields(rows = table.len(), columns = table.headers().len()))]
    pub fn load(&self, table: &RawTable) -> ImportResult<LoadOutcome> {
        // === 步骤 1: 表头校验 ===
        if !table.has_column(&self.id_column) {
            return Err(ImportError::MissingIdentifierColumn {
                column: self.id_column.clone(),
            });
        }

        let layout = self.classify_columns(table);
        if layout.catalog_columns.is_empty() {
            return Err(ImportError::NoLocationColumns {
                catalog_size: self.catalog.len(),
            });
        }

        let mut diagnostics = Diagnostics::new();
        for column in &layout.unknown_columns {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::UnknownLocationColumn,
                    format!("列 {} 不在位置目录中,不计入汇总", column),
                )
                .on_field(column),
            );
        }

        // === 步骤 2: 逐行映射 ===
        let mut items = Vec::with_capacity(table.len());
        let mut seen_ids: HashMap<String, usize> = HashMap::new();

        for row in table.rows() {
            let item_id = self.resolve_item_id(row, &mut diagnostics);

            if let Some(first_row) = seen_ids.get(&item_id) {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::DuplicateIdentifier,
                        format!("主键 {} 重复（首次出现于第 {} 行）", item_id, first_row),
                    )
                    .for_item(&item_id)
                    .at_row(row.row_number),
                );
            } else {
                seen_ids.insert(item_id.clone(), row.row_number);
            }

            let mut item = ItemRecord::new(&item_id).with_row_number(row.row_number);
            self.map_catalog_cells(row, &layout, &mut item, &mut diagnostics);
            self.map_unknown_cells(row, &layout, &mut item);
            item.current_status = self.map_status(row, &layout, &item_id, &mut diagnostics);

            items.push(item);
        }

        info!(
            items = items.len(),
            diagnostics = diagnostics.len(),
            unknown_columns = layout.unknown_columns.len(),
            "货物记录加载完成"
        );

        Ok(LoadOutcome {
            items,
            diagnostics,
            unknown_columns: layout
                .unknown_columns
                .iter()
                .map(|c| c.to_string())
                .collect(),
        })
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    fn classify_columns<'a>(&self, table: &'a RawTable) -> ColumnLayout<'a> {
        let mut layout = ColumnLayout {
            catalog_columns: Vec::new(),
            unknown_columns: Vec::new(),
            has_status_class: false,
            has_status_location: false,
        };

        for header in table.headers() {
            let header = header.as_str();
            if header.is_empty() || header == self.id_column || self.ignored_columns.contains(header)
            {
                continue;
            }
            if header == self.status_class_column {
                layout.has_status_class = true;
            } else if header == self.status_location_column {
                layout.has_status_location = true;
            } else if self.catalog.contains(header) {
                layout.catalog_columns.push(header);
            } else {
                layout.unknown_columns.push(header);
            }
        }
        layout
    }

    fn resolve_item_id(&self, row: &RawRow, diagnostics: &mut Diagnostics) -> String {
        let raw = row.get(&self.id_column);
        if !is_null_cell(raw) {
            return raw.to_string();
        }

        let synthetic = format!("ROW-{}", row.row_number);
        diagnostics.push(
            Diagnostic::error(
                DiagnosticKind::MissingIdentifier,
                format!("第 {} 行主键为空,以 {} 代替", row.row_number, synthetic),
            )
            .for_item(&synthetic)
            .at_row(row.row_number)
            .on_field(&self.id_column),
        );
        synthetic
    }

    fn map_catalog_cells(
        &self,
        row: &RawRow,
        layout: &ColumnLayout<'_>,
        item: &mut ItemRecord,
        diagnostics: &mut Diagnostics,
    ) {
        for column in &layout.catalog_columns {
            let raw = row.get(column);
            if is_null_cell(raw) {
                item.locations.insert(column.to_string(), None);
                continue;
            }
            match parse_timestamp(raw) {
                Some(ts) => {
                    item.locations.insert(column.to_string(), Some(ts));
                }
                None => {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::MalformedTimestamp,
                            format!("无法解析时间戳 {:?},单元格已丢弃", raw),
                        )
                        .for_item(&item.item_id)
                        .at_row(row.row_number)
                        .on_field(column),
                    );
                    item.locations.insert(column.to_string(), None);
                }
            }
        }
    }

    /// 未登记列中可解析为时间戳的单元格保留在记录中,由引擎按 Unknown 处理
    fn map_unknown_cells(&self, row: &RawRow, layout: &ColumnLayout<'_>, item: &mut ItemRecord) {
        for column in &layout.unknown_columns {
            if let Some(ts) = parse_timestamp(row.get(column)) {
                item.locations.insert(column.to_string(), Some(ts));
            }
        }
    }

    fn map_status(
        &self,
        row: &RawRow,
        layout: &ColumnLayout<'_>,
        item_id: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<CurrentStatus> {
        let raw_class = if layout.has_status_class {
            row.get(&self.status_class_column)
        } else {
            ""
        };
        let raw_location = if layout.has_status_location {
            row.get(&self.status_location_column)
        } else {
            ""
        };

        if is_null_cell(raw_location) {
            if !is_null_cell(raw_class) {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::StatusMismatch,
                        format!("状态快照只有类别 {} 没有位置,已忽略", raw_class),
                    )
                    .for_item(item_id)
                    .at_row(row.row_number)
                    .on_field(&self.status_location_column),
                );
            }
            return None;
        }

        let catalog_class = self.catalog.class_of(raw_location);
        if catalog_class == LocationClass::Unknown {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::StatusMismatch,
                    format!("状态快照位置 {} 不在目录中,已忽略", raw_location),
                )
                .for_item(item_id)
                .at_row(row.row_number)
                .on_field(&self.status_location_column),
            );
            return None;
        }

        // 类别以目录为准
        if !is_null_cell(raw_class) && LocationClass::from_str(raw_class) != catalog_class {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::StatusMismatch,
                    format!(
                        "状态快照类别 {} 与位置 {} 的目录类别 {} 不一致,按目录处理",
                        raw_class, raw_location, catalog_class
                    ),
                )
                .for_item(item_id)
                .at_row(row.row_number)
                .on_field(&self.status_class_column),
            );
        }

        Some(CurrentStatus {
            class: catalog_class,
            location: raw_location.trim().to_string(),
        })
    }
}
