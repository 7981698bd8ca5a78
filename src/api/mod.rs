// ==========================================
// 值班排班管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 Tauri 命令调用
// ==========================================

pub mod error;
pub mod rule_api;
pub mod schedule_api;
pub mod semester_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use rule_api::RuleApi;
pub use schedule_api::{
    AutoScheduleResult, CandidateView, ChangeLogPage, ScheduleApi, ScheduleView,
    ScopeCheckResult, ValidateCandidateResult,
};
pub use semester_api::{PhaseCheckItem, PhaseCheckResult, SemesterApi};
