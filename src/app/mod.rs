// ==========================================
// 值班排班管理系统 - 应用层
// ==========================================
// 职责: 应用状态组装与 Tauri 集成
// ==========================================

pub mod state;

#[cfg(feature = "tauri-app")]
pub mod tauri_commands;

pub use state::{get_default_db_path, AppState};
