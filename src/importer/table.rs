// ==========================================
// 物流流向对账引擎 - 原始宽表
// ==========================================
// 职责: 承接外部加载方交付的表格（表头 + 行）
// 支持: 任意 CSV 读取流 / 已解析的行映射
// 红线: 不打开数据文件,文件 I/O 由外部协作方负责
// ==========================================

use crate::importer::error::ImportResult;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Read;

// ==========================================
// RawRow - 原始数据行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,             // 数据行号（表头为第 1 行）
    pub cells: HashMap<String, String>, // 表头 -> 单元格文本（已 TRIM）
}

impl RawRow {
    /// 读取单元格（缺列视为空）
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(|s| s.as_str()).unwrap_or("")
    }
}

// ==========================================
// RawTable - 原始宽表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
    next_row_number: usize,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
            next_row_number: 2,
        }
    }

    /// 从已解析的行映射构建（外部加载方的交付形态）
    pub fn from_records(headers: Vec<String>, records: Vec<HashMap<String, String>>) -> Self {
        let mut table = Self::new(headers);
        for record in records {
            table.push_row(record);
        }
        table
    }

    /// 从 CSV 读取流构建
    ///
    /// # 规则
    /// - 第一行为表头（TRIM）
    /// - 允许行长度不一致
    /// - 跳过完全空白的行
    pub fn from_csv_reader<R: Read>(reader: R) -> ImportResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = Self::new(headers);
        for result in reader.records() {
            let record = result?;
            let mut row_map = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = table.headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }
            table.push_row(row_map);
        }

        tracing::debug!(
            columns = table.headers.len(),
            rows = table.rows.len(),
            "CSV 表格已解析"
        );
        Ok(table)
    }

    /// 追加一行（完全空白的行被跳过,但仍占用行号）
    pub fn push_row(&mut self, cells: HashMap<String, String>) {
        let row_number = self.next_row_number;
        self.next_row_number += 1;

        let cells: HashMap<String, String> = cells
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        if cells.values().all(|v| v.is_empty()) {
            return;
        }
        self.rows.push(RawRow { row_number, cells });
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column.trim())
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_reader_basic() {
        let data = "Case No., DSV Indoor ,MIR\nC-1,2024-01-10,2024-01-25\nC-2,,2024-02-01\n";
        let table = RawTable::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(table.headers(), &["Case No.", "DSV Indoor", "MIR"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("DSV Indoor"), "2024-01-10");
        assert_eq!(table.rows()[1].get("DSV Indoor"), "");
        assert_eq!(table.rows()[0].row_number, 2);
    }

    #[test]
    fn test_csv_reader_skips_blank_rows_keeps_numbering() {
        let data = "Case No.,MIR\nC-1,2024-01-10\n,\nC-3,2024-03-01\n";
        let table = RawTable::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].get("Case No."), "C-3");
        assert_eq!(table.rows()[1].row_number, 4);
    }

    #[test]
    fn test_csv_reader_flexible_rows() {
        let data = "Case No.,MIR,SHU\nC-1,2024-01-10\n";
        let table = RawTable::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].get("SHU"), "");
    }

    #[test]
    fn test_from_records_trims() {
        let mut row = HashMap::new();
        row.insert(" Case No. ".to_string(), " C-9 ".to_string());
        let table = RawTable::from_records(vec!["Case No.".to_string()], vec![row]);
        assert!(table.has_column("Case No."));
        assert_eq!(table.rows()[0].get("Case No."), "C-9");
    }
}
