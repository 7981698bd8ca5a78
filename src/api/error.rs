// ==========================================
// 值班排班管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换 Repository/Engine 错误为用户可读的业务错误
// 约束: 每种拒绝都有稳定错误码,部分成功通过 warnings 呈现而非报错
// ==========================================

use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 配置错误 (阻断自动排班)
    // ==========================================
    #[error("无激活学期")]
    NoActiveSemester,

    #[error("无启用时间段: semester_id={0}")]
    NoActiveTimeSlots(String),

    #[error("无启用值班地点")]
    NoActiveLocations,

    #[error("学期未圈定值班人员: semester_id={0}")]
    NoDutyMembers(String),

    #[error("无合格排班候选人: semester_id={0}")]
    NoCandidates(String),

    // ==========================================
    // 覆盖率不足 (阻断自动排班)
    // ==========================================
    #[error("课表提交率未达100%: 已提交{submitted}/{total}人")]
    SubmissionIncomplete { submitted: i64, total: i64 },

    // ==========================================
    // 状态错误 (同步拒绝,不自动纠正)
    // ==========================================
    #[error("排班表已发布,不可执行此操作: schedule_id={0}")]
    ScheduleAlreadyPublished(String),

    #[error("排班表非草稿状态,不可执行此操作: schedule_id={0}")]
    ScheduleNotDraft(String),

    #[error("排班表非已发布状态,不可执行此操作: schedule_id={0}")]
    ScheduleNotPublished(String),

    #[error("发布后修改必须填写原因")]
    ReasonRequired,

    #[error("填充率未达发布要求: {filled}/{total}格, 要求{required_pct}%")]
    FillRateInsufficient {
        filled: i64,
        total: i64,
        required_pct: u32,
    },

    #[error("候选人在该时段不可用: {}", .conflicts.join("; "))]
    CandidateNotAvailable { conflicts: Vec<String> },

    #[error("该规则不可配置: {0}")]
    RuleNotConfigurable(String),

    #[error("无效的阶段跳转: from={from} to={to}")]
    InvalidPhaseTransition { from: String, to: String },

    #[error("阶段推进无效: 前置条件未满足")]
    PhasePreconditionFailed,

    // ==========================================
    // 并发冲突 (可重试)
    // ==========================================
    #[error("并发冲突,请重试: {0}")]
    Conflict(String),

    // ==========================================
    // 求解超时
    // ==========================================
    #[error("排班求解超时: {0}")]
    SolverTimeout(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码 (供前端做消息映射,不随错误文案变化)
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NoActiveSemester => "NO_ACTIVE_SEMESTER",
            ApiError::NoActiveTimeSlots(_) => "NO_ACTIVE_TIME_SLOTS",
            ApiError::NoActiveLocations => "NO_ACTIVE_LOCATIONS",
            ApiError::NoDutyMembers(_) => "NO_DUTY_MEMBERS",
            ApiError::NoCandidates(_) => "NO_CANDIDATES",
            ApiError::SubmissionIncomplete { .. } => "SUBMISSION_INCOMPLETE",
            ApiError::ScheduleAlreadyPublished(_) => "SCHEDULE_ALREADY_PUBLISHED",
            ApiError::ScheduleNotDraft(_) => "SCHEDULE_NOT_DRAFT",
            ApiError::ScheduleNotPublished(_) => "SCHEDULE_NOT_PUBLISHED",
            ApiError::ReasonRequired => "REASON_REQUIRED",
            ApiError::FillRateInsufficient { .. } => "FILL_RATE_INSUFFICIENT",
            ApiError::CandidateNotAvailable { .. } => "CANDIDATE_NOT_AVAILABLE",
            ApiError::RuleNotConfigurable(_) => "RULE_NOT_CONFIGURABLE",
            ApiError::InvalidPhaseTransition { .. } => "INVALID_PHASE_TRANSITION",
            ApiError::PhasePreconditionFailed => "PHASE_PRECONDITION_FAILED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::SolverTimeout(_) => "SOLVER_TIMEOUT",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// 判断是否为可重试的并发冲突
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误 → 可重试冲突
            RepositoryError::OptimisticLockFailure {
                entity,
                id,
                expected,
                actual,
            } => ApiError::Conflict(format!(
                "{}({})已被其他操作修改（期望revision={}，实际revision={}）",
                entity, id, expected, actual
            )),

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }

            // 业务规则错误
            RepositoryError::BusinessRuleViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidPhaseTransition { from, to }
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NoCandidates { semester_id } => ApiError::NoCandidates(semester_id),
            EngineError::Timeout { .. } => ApiError::SolverTimeout(err.to_string()),
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimistic_lock_maps_to_retryable_conflict() {
        let repo_err = RepositoryError::OptimisticLockFailure {
            entity: "Schedule".to_string(),
            id: "sch1".to_string(),
            expected: 1,
            actual: 2,
        };
        let api_err: ApiError = repo_err.into();
        assert!(api_err.is_retryable());
        assert_eq!(api_err.code(), "CONFLICT");
    }

    #[test]
    fn test_engine_timeout_maps_to_solver_timeout() {
        let engine_err = EngineError::Timeout {
            completed_cells: 3,
            total_cells: 10,
            budget_ms: 100,
        };
        let api_err: ApiError = engine_err.into();
        assert_eq!(api_err.code(), "SOLVER_TIMEOUT");
        assert!(!api_err.is_retryable());
    }

    #[test]
    fn test_not_found_conversion_keeps_entity() {
        let repo_err = RepositoryError::NotFound {
            entity: "ScheduleItem".to_string(),
            id: "item1".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("ScheduleItem"));
                assert!(msg.contains("item1"));
            }
            _ => panic!("Expected NotFound"),
        }
    }
}
