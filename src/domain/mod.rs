// ==========================================
// 值班排班管理系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含数据访问
// ==========================================

pub mod change_log;
pub mod member;
pub mod rule;
pub mod schedule;
pub mod semester;
pub mod types;

// 重导出核心实体
pub use change_log::ScheduleChangeLog;
pub use member::{CourseOccurrence, Department, DutyMember, Location, MemberBrief, UnavailableEntry};
pub use rule::ScheduleRule;
pub use schedule::{Schedule, ScheduleItem};
pub use semester::{Semester, TimeSlot};
