// ==========================================
// 物流流向对账引擎 - 位置目录
// ==========================================
// 职责: 定义登记位置集合（仓库 / 枢纽 / 现场）及声明顺序
// 红线: 声明顺序即同时间戳的排序口径,不可随意重排
// ==========================================

use crate::domain::types::LocationClass;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// CatalogEntry - 目录条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,          // 位置名称（即宽表列名）
    pub class: LocationClass,  // 位置类别
}

impl CatalogEntry {
    pub fn new(name: &str, class: LocationClass) -> Self {
        Self {
            name: name.to_string(),
            class,
        }
    }
}

// ==========================================
// LocationCatalog - 位置目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>, // name -> 声明序号
}

impl LocationCatalog {
    /// 从目录条目构建
    ///
    /// # 校验规则
    /// 1. 目录不能为空
    /// 2. 名称不能为空、不能重复
    /// 3. 类别不能为 Unknown
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, String> {
        if entries.is_empty() {
            return Err("位置目录不能为空".to_string());
        }

        let mut normalized = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err("位置名称不能为空".to_string());
            }
            if entry.class == LocationClass::Unknown {
                return Err(format!("位置 {} 的类别不能为 UNKNOWN", name));
            }
            if index.insert(name.clone(), normalized.len()).is_some() {
                return Err(format!("位置 {} 重复登记", name));
            }
            normalized.push(CatalogEntry {
                name,
                class: entry.class,
            });
        }

        Ok(Self {
            entries: normalized,
            index,
        })
    }

    /// 默认目录（HVDC 项目网络）
    pub fn default_network() -> Self {
        let entries = vec![
            CatalogEntry::new("DSV Indoor", LocationClass::Warehouse),
            CatalogEntry::new("DSV Al Markaz", LocationClass::Warehouse),
            CatalogEntry::new("DSV Outdoor", LocationClass::Warehouse),
            CatalogEntry::new("AAA Storage", LocationClass::Warehouse),
            CatalogEntry::new("Hauler Indoor", LocationClass::Warehouse),
            CatalogEntry::new("DSV MZP", LocationClass::Warehouse),
            CatalogEntry::new("MOSB", LocationClass::Hub),
            CatalogEntry::new("MIR", LocationClass::Site),
            CatalogEntry::new("SHU", LocationClass::Site),
            CatalogEntry::new("DAS", LocationClass::Site),
            CatalogEntry::new("AGI", LocationClass::Site),
        ];

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.insert(entry.name.clone(), i);
        }
        Self { entries, index }
    }

    /// 查询位置类别（未登记 → Unknown）
    pub fn class_of(&self, name: &str) -> LocationClass {
        self.index
            .get(name.trim())
            .map(|&i| self.entries[i].class)
            .unwrap_or(LocationClass::Unknown)
    }

    /// 查询声明序号
    pub fn order_of(&self, name: &str) -> Option<usize> {
        self.index.get(name.trim()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name.trim())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// 某类别的全部位置（保持声明顺序）
    pub fn names_of(&self, class: LocationClass) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.class == class)
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationCatalog {
    fn default() -> Self {
        Self::default_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_network_partition() {
        let catalog = LocationCatalog::default_network();
        assert_eq!(catalog.names_of(LocationClass::Warehouse).len(), 6);
        assert_eq!(catalog.names_of(LocationClass::Hub), vec!["MOSB"]);
        assert_eq!(catalog.names_of(LocationClass::Site), vec!["MIR", "SHU", "DAS", "AGI"]);
        assert_eq!(catalog.order_of("DSV Indoor"), Some(0));
        assert_eq!(catalog.class_of(" MOSB "), LocationClass::Hub);
    }

    #[test]
    fn test_from_entries_rejects_empty_and_duplicates() {
        assert!(LocationCatalog::from_entries(vec![]).is_err());

        let dup = vec![
            CatalogEntry::new("WH-A", LocationClass::Warehouse),
            CatalogEntry::new("WH-A", LocationClass::Site),
        ];
        let err = LocationCatalog::from_entries(dup).unwrap_err();
        assert!(err.contains("重复"));

        let unknown = vec![CatalogEntry::new("X", LocationClass::Unknown)];
        assert!(LocationCatalog::from_entries(unknown).is_err());
    }

    #[test]
    fn test_from_entries_trims_names() {
        let catalog = LocationCatalog::from_entries(vec![
            CatalogEntry::new("  WH-A ", LocationClass::Warehouse),
            CatalogEntry::new("SITE-B", LocationClass::Site),
        ])
        .unwrap();
        assert_eq!(catalog.class_of("WH-A"), LocationClass::Warehouse);
        assert_eq!(catalog.order_of("SITE-B"), Some(1));
        assert_eq!(catalog.class_of("wh-a"), LocationClass::Unknown);
    }
}
