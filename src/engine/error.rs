// ==========================================
// 值班排班管理系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 学期内没有任何合格候选人 (配置错误,而非"合法的空排班")
    #[error("无合格排班候选人: semester_id={semester_id}")]
    NoCandidates { semester_id: String },

    /// 求解超出时间预算,宁可失败也不返回半成品
    #[error("排班求解超时: 已处理{completed_cells}/{total_cells}格, 预算{budget_ms}ms")]
    Timeout {
        completed_cells: usize,
        total_cells: usize,
        budget_ms: u64,
    },

    /// 输入不满足引擎前置条件
    #[error("引擎输入无效: {0}")]
    InvalidInput(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
