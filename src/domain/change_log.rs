// ==========================================
// 值班排班管理系统 - 排班变更日志领域模型
// ==========================================
// 红线: 仅追加,不可修改/删除
// 用途: 发布后修改的审计追踪
// ==========================================

use crate::domain::types::ChangeType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleChangeLog - 排班变更日志
// ==========================================
// 对排班项为弱引用: 排班项再次改派后日志依然保留
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleChangeLog {
    pub change_log_id: String,              // 日志ID
    pub schedule_id: String,                // 所属排班表
    pub schedule_item_id: String,           // 关联排班项 (弱引用)
    pub original_member_id: Option<String>, // 原指派人员 (空缺格改派时为 None)
    pub new_member_id: String,              // 新指派人员
    pub change_type: ChangeType,            // 变更类型
    pub reason: String,                     // 变更原因 (非空)
    pub operator: String,                   // 操作人
    pub created_at: NaiveDateTime,          // 记录时间
}

impl ScheduleChangeLog {
    /// 创建新的变更日志
    pub fn new(
        schedule_id: String,
        schedule_item_id: String,
        original_member_id: Option<String>,
        new_member_id: String,
        change_type: ChangeType,
        reason: String,
        operator: String,
    ) -> Self {
        Self {
            change_log_id: uuid::Uuid::new_v4().to_string(),
            schedule_id,
            schedule_item_id,
            original_member_id,
            new_member_id,
            change_type,
            reason,
            operator,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
