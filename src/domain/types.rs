// ==========================================
// 值班排班管理系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 排班表状态 (Schedule Status)
// ==========================================
// 状态机: DRAFT → PUBLISHED (单向,不可撤回发布)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Draft,     // 草稿
    Published, // 已发布
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Draft => write!(f, "DRAFT"),
            ScheduleStatus::Published => write!(f, "PUBLISHED"),
        }
    }
}

impl ScheduleStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PUBLISHED" => ScheduleStatus::Published,
            _ => ScheduleStatus::Draft, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Draft => "DRAFT",
            ScheduleStatus::Published => "PUBLISHED",
        }
    }
}

// ==========================================
// 学期阶段 (Semester Phase)
// ==========================================
// 阶段顺序: CONFIGURING → COLLECTING → SCHEDULING → PUBLISHED
// 前进逐步推进且有条件检查,回退任意(保留数据)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemesterPhase {
    Configuring, // 配置中 (时间段/地点/人员)
    Collecting,  // 课表收集中
    Scheduling,  // 排班中
    Published,   // 已发布
}

impl fmt::Display for SemesterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemesterPhase::Configuring => write!(f, "CONFIGURING"),
            SemesterPhase::Collecting => write!(f, "COLLECTING"),
            SemesterPhase::Scheduling => write!(f, "SCHEDULING"),
            SemesterPhase::Published => write!(f, "PUBLISHED"),
        }
    }
}

impl SemesterPhase {
    /// 从字符串解析阶段
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COLLECTING" => SemesterPhase::Collecting,
            "SCHEDULING" => SemesterPhase::Scheduling,
            "PUBLISHED" => SemesterPhase::Published,
            _ => SemesterPhase::Configuring, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SemesterPhase::Configuring => "CONFIGURING",
            SemesterPhase::Collecting => "COLLECTING",
            SemesterPhase::Scheduling => "SCHEDULING",
            SemesterPhase::Published => "PUBLISHED",
        }
    }

    /// 阶段序号 (用于前进/回退判定)
    pub fn index(&self) -> usize {
        match self {
            SemesterPhase::Configuring => 0,
            SemesterPhase::Collecting => 1,
            SemesterPhase::Scheduling => 2,
            SemesterPhase::Published => 3,
        }
    }
}

// ==========================================
// 周次类型 (Week Parity)
// ==========================================
// 课程/不可用时间的单双周适用范围
// 物理周的单双标签由学期 first_week_type 决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekParity {
    All,  // 每周
    Odd,  // 单周
    Even, // 双周
}

impl fmt::Display for WeekParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekParity::All => write!(f, "ALL"),
            WeekParity::Odd => write!(f, "ODD"),
            WeekParity::Even => write!(f, "EVEN"),
        }
    }
}

impl WeekParity {
    /// 从字符串解析周次类型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ODD" => WeekParity::Odd,
            "EVEN" => WeekParity::Even,
            _ => WeekParity::All, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WeekParity::All => "ALL",
            WeekParity::Odd => "ODD",
            WeekParity::Even => "EVEN",
        }
    }

    /// 判断与另一周次类型是否相容 (ALL 与任何类型相容)
    pub fn matches(&self, other: WeekParity) -> bool {
        *self == WeekParity::All || other == WeekParity::All || *self == other
    }
}

// ==========================================
// 重复类型 (Repeat Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatType {
    Weekly,   // 每周
    Biweekly, // 隔周 (按首个适用周的奇偶锚定)
    Once,     // 仅一次 (specific_date)
}

impl fmt::Display for RepeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatType::Weekly => write!(f, "WEEKLY"),
            RepeatType::Biweekly => write!(f, "BIWEEKLY"),
            RepeatType::Once => write!(f, "ONCE"),
        }
    }
}

impl RepeatType {
    /// 从字符串解析重复类型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "BIWEEKLY" => RepeatType::Biweekly,
            "ONCE" => RepeatType::Once,
            _ => RepeatType::Weekly, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RepeatType::Weekly => "WEEKLY",
            RepeatType::Biweekly => "BIWEEKLY",
            RepeatType::Once => "ONCE",
        }
    }
}

// ==========================================
// 变更类型 (Change Type)
// ==========================================
// 仅发布后的修改进入审计日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    ManualAdjust,    // 人工调整
    PublishedModify, // 发布后修改
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::ManualAdjust => write!(f, "MANUAL_ADJUST"),
            ChangeType::PublishedModify => write!(f, "PUBLISHED_MODIFY"),
        }
    }
}

impl ChangeType {
    /// 从字符串解析变更类型
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PUBLISHED_MODIFY" => ChangeType::PublishedModify,
            _ => ChangeType::ManualAdjust, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ChangeType::ManualAdjust => "MANUAL_ADJUST",
            ChangeType::PublishedModify => "PUBLISHED_MODIFY",
        }
    }
}

// ==========================================
// 课表提交状态 (Timetable Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimetableStatus {
    NotSubmitted, // 未提交
    Submitted,    // 已提交
}

impl fmt::Display for TimetableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimetableStatus::NotSubmitted => write!(f, "NOT_SUBMITTED"),
            TimetableStatus::Submitted => write!(f, "SUBMITTED"),
        }
    }
}

impl TimetableStatus {
    /// 从字符串解析提交状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SUBMITTED" => TimetableStatus::Submitted,
            _ => TimetableStatus::NotSubmitted, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TimetableStatus::NotSubmitted => "NOT_SUBMITTED",
            TimetableStatus::Submitted => "SUBMITTED",
        }
    }
}
