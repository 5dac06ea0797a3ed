// ==========================================
// 集成测试辅助模块
// ==========================================

#![allow(dead_code)]

pub mod item_builder;
pub mod mock_config;

pub use item_builder::{batch, dt, ym, ItemBuilder};
pub use mock_config::MockConfig;
