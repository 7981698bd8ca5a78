// ==========================================
// 值班排班管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod change_log_repo;
pub mod error;
pub mod location_repo;
pub mod member_repo;
pub mod rule_repo;
pub mod schedule_repo;
pub mod semester_repo;
pub mod time_slot_repo;

// 重导出核心仓储
pub use change_log_repo::ScheduleChangeLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use location_repo::LocationRepository;
pub use member_repo::DutyMemberRepository;
pub use rule_repo::ScheduleRuleRepository;
pub use schedule_repo::{ScheduleItemRepository, ScheduleRepository};
pub use semester_repo::SemesterRepository;
pub use time_slot_repo::TimeSlotRepository;
