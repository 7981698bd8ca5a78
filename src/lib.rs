// ==========================================
// 值班排班管理系统 - 核心库
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// 系统定位: 学期值班自动排班与审计
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 可用性解析/规则/自动排班
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - Tauri 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ChangeType, RepeatType, ScheduleStatus, SemesterPhase, TimetableStatus, WeekParity,
};

// 领域实体
pub use domain::{
    CourseOccurrence, Department, DutyMember, Location, MemberBrief, Schedule, ScheduleChangeLog,
    ScheduleItem, ScheduleRule, Semester, TimeSlot, UnavailableEntry,
};

// 引擎
pub use engine::{
    AssignmentEngine, AssignmentOutcome, AvailabilityResolver, AvailabilityVerdict, RuleKind,
    RuleOutcome, RuleSet,
};

// API
pub use api::{RuleApi, ScheduleApi, SemesterApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "值班排班管理系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
