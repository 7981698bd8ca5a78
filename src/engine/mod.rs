// ==========================================
// 值班排班管理系统 - 引擎层
// ==========================================
// 职责: 可用性解析 / 约束规则 / 自动排班求解
// 红线: 引擎不直接写库,只计算并返回结果
// ==========================================

pub mod assigner;
pub mod availability;
pub mod error;
pub mod rules;

// 重导出核心类型
pub use assigner::{AssignmentCell, AssignmentEngine, AssignmentOutcome};
pub use availability::{AvailabilityResolver, AvailabilityVerdict};
pub use error::{EngineError, EngineResult};
pub use rules::{AssignmentTracker, Candidate, RuleContext, RuleKind, RuleOutcome, RuleSet};
