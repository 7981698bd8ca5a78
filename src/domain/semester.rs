// ==========================================
// 值班排班管理系统 - 学期与时间段领域模型
// ==========================================
// 学期是排班的根聚合: 日期范围决定总周数,
// first_week_type 决定物理周的单双标签
// ==========================================

use crate::domain::types::{SemesterPhase, WeekParity};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Semester - 学期
// ==========================================
// 约束: 全局同时只有一个激活学期 (库层唯一索引保证)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub semester_id: String,          // 学期ID
    pub name: String,                 // 学期名称
    pub start_date: NaiveDate,        // 起始日期
    pub end_date: NaiveDate,          // 结束日期
    pub first_week_type: WeekParity,  // 第一周的单双标签 (odd/even)
    pub is_active: bool,              // 是否激活
    pub phase: SemesterPhase,         // 生命周期阶段
    pub created_at: NaiveDateTime,    // 创建时间
    pub updated_at: NaiveDateTime,    // 更新时间
    pub revision: i32,                // 乐观锁：修订号
}

impl Semester {
    /// 学期总周数 (按7天一周向上取整,至少1周)
    pub fn total_weeks(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days();
        if days < 0 {
            return 1;
        }
        let weeks = (days + 1 + 6) / 7;
        weeks.max(1) as u32
    }

    /// 计算第 week_number 周 (1-based) 的单双标签
    ///
    /// 第1周携带 first_week_type 标签,之后逐周交替。
    pub fn week_parity_of(&self, week_number: u32) -> WeekParity {
        let first_is_odd = self.first_week_type == WeekParity::Odd;
        let week_is_first_parity = week_number % 2 == 1;
        match (first_is_odd, week_is_first_parity) {
            (true, true) | (false, false) => WeekParity::Odd,
            _ => WeekParity::Even,
        }
    }

    /// 计算某具体日期落在第几周 (1-based),超出范围返回 None
    pub fn week_number_of(&self, date: NaiveDate) -> Option<u32> {
        if date < self.start_date || date > self.end_date {
            return None;
        }
        let days = (date - self.start_date).num_days();
        Some((days / 7) as u32 + 1)
    }

    /// 判断是否处于已发布阶段
    pub fn is_published_phase(&self) -> bool {
        self.phase == SemesterPhase::Published
    }
}

// ==========================================
// TimeSlot - 时间段
// ==========================================
// 每周固定网格: 星期 + 起止时间 ("HH:MM")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time_slot_id: String,        // 时间段ID
    pub name: String,                // 名称 (如"周一早班")
    pub semester_id: Option<String>, // 所属学期 (None 表示全局默认)
    pub day_of_week: u8,             // 星期 (1-5)
    pub start_time: String,          // 开始时间 "HH:MM"
    pub end_time: String,            // 结束时间 "HH:MM"
    pub is_active: bool,             // 是否启用
}

impl TimeSlot {
    /// 判断与给定区间在同一星期上是否时间重叠 (半开区间 [start,end))
    ///
    /// "HH:MM" 字符串按字典序比较即时间序,与原始课表数据格式一致。
    pub fn overlaps(&self, start: &str, end: &str) -> bool {
        self.start_time.as_str() < end && start < self.end_time.as_str()
    }
}
