// ==========================================
// 值班排班管理系统 - 排班表领域模型
// ==========================================
// 约束: 每学期同时只有一份排班表 (库层唯一索引保证)
// 排班项按 (周, 时间段) 一格一条,空缺格也落库 (member_id 为空)
// ==========================================

use crate::domain::member::MemberBrief;
use crate::domain::types::ScheduleStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Schedule - 排班表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: String,                // 排班表ID
    pub semester_id: String,                // 所属学期
    pub status: ScheduleStatus,             // 状态 (draft/published)
    pub published_at: Option<NaiveDateTime>, // 发布时间
    pub created_by: Option<String>,         // 创建人
    pub created_at: NaiveDateTime,          // 创建时间
    pub updated_at: NaiveDateTime,          // 更新时间
    pub revision: i32,                      // 乐观锁：修订号
}

impl Schedule {
    /// 判断是否为草稿状态
    pub fn is_draft(&self) -> bool {
        self.status == ScheduleStatus::Draft
    }

    /// 判断是否已发布
    pub fn is_published(&self) -> bool {
        self.status == ScheduleStatus::Published
    }
}

// ==========================================
// ScheduleItem - 排班项
// ==========================================
// 不变式: 同一排班表内 (week_number, time_slot_id) 唯一
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub schedule_item_id: String,     // 排班项ID
    pub schedule_id: String,          // 所属排班表
    pub week_number: u32,             // 周次 (1..N)
    pub time_slot_id: String,         // 时间段ID
    pub member_id: Option<String>,    // 指派人员 (None 表示空缺)
    pub location_id: Option<String>,  // 值班地点 (可空)
}

impl ScheduleItem {
    /// 判断该格是否已填充
    pub fn is_filled(&self) -> bool {
        self.member_id.is_some()
    }
}

// ==========================================
// ScheduleItemView - 排班项视图 (带关联简要信息)
// ==========================================
// 由 API 层从 time_slot / duty_member / location 动态补充
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItemView {
    pub schedule_item_id: String,
    pub schedule_id: String,
    pub week_number: u32,
    pub time_slot_id: String,
    pub time_slot_name: Option<String>,
    pub day_of_week: Option<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub member: Option<MemberBrief>,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
}
