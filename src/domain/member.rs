// ==========================================
// 值班排班管理系统 - 人员与可用性输入领域模型
// ==========================================
// 值班人员按学期圈定 (duty_required);
// 课表/不可用时间是可用性判定的唯一输入,
// 均为已完成周期解析的结构化记录 (外部导入协作方提供)
// ==========================================

use crate::domain::types::{RepeatType, TimetableStatus, WeekParity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// DutyMember - 值班人员 (学期维度)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyMember {
    pub user_id: String,                  // 用户ID
    pub semester_id: String,              // 所属学期
    pub name: String,                     // 姓名
    pub student_no: Option<String>,       // 学号
    pub department_id: Option<String>,    // 部门ID
    pub department_name: Option<String>,  // 部门名称
    pub duty_required: bool,              // 本学期是否需要值班
    pub timetable_status: TimetableStatus, // 课表提交状态
}

impl DutyMember {
    /// 判断是否为合格候选人 (需值班且已提交课表)
    pub fn is_eligible(&self) -> bool {
        self.duty_required && self.timetable_status == TimetableStatus::Submitted
    }

    /// 转为简要信息
    pub fn brief(&self) -> MemberBrief {
        MemberBrief {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            student_no: self.student_no.clone(),
            department_id: self.department_id.clone(),
            department_name: self.department_name.clone(),
        }
    }
}

// ==========================================
// MemberBrief - 人员简要信息 (用于排班项/候选人响应)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberBrief {
    pub user_id: String,
    pub name: String,
    pub student_no: Option<String>,
    pub department_id: Option<String>,
    pub department_name: Option<String>,
}

// ==========================================
// Department - 部门
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub department_id: String,
    pub name: String,
}

// ==========================================
// CourseOccurrence - 课程记录
// ==========================================
// 周期语义: repeat_type × week_type,
// 由可用性解析器展开为具体 (周, 星期) 发生集
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOccurrence {
    pub course_id: String,               // 课程记录ID
    pub user_id: String,                 // 用户ID
    pub semester_id: String,             // 学期ID
    pub course_name: String,             // 课程名称
    pub day_of_week: u8,                 // 星期 (1-7)
    pub start_time: String,              // 开始时间 "HH:MM"
    pub end_time: String,                // 结束时间 "HH:MM"
    pub week_type: WeekParity,           // 周次类型 (all/odd/even)
    pub repeat_type: RepeatType,         // 重复类型 (weekly/biweekly/once)
    pub specific_date: Option<NaiveDate>, // 仅 once 使用
}

// ==========================================
// UnavailableEntry - 不可用时间
// ==========================================
// 与课程记录同构的周期语义,附自述原因
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableEntry {
    pub entry_id: String,                // 记录ID
    pub user_id: String,                 // 用户ID
    pub semester_id: String,             // 学期ID
    pub day_of_week: u8,                 // 星期 (1-7)
    pub start_time: String,              // 开始时间 "HH:MM"
    pub end_time: String,                // 结束时间 "HH:MM"
    pub reason: Option<String>,          // 原因 (可空)
    pub week_type: WeekParity,           // 周次类型
    pub repeat_type: RepeatType,         // 重复类型
    pub specific_date: Option<NaiveDate>, // 仅 once 使用
}

// ==========================================
// Location - 值班地点
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String, // 地点ID
    pub name: String,        // 名称
    pub is_default: bool,    // 默认地点
    pub is_active: bool,     // 是否启用
}
