// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use duty_roster::api::{RuleApi, ScheduleApi, SemesterApi};
use duty_roster::config::ConfigManager;
use duty_roster::domain::member::{CourseOccurrence, DutyMember, Location, UnavailableEntry};
use duty_roster::domain::semester::{Semester, TimeSlot};
use duty_roster::domain::types::{RepeatType, SemesterPhase, TimetableStatus, WeekParity};
use duty_roster::repository::{
    DutyMemberRepository, LocationRepository, ScheduleChangeLogRepository,
    ScheduleItemRepository, ScheduleRepository, ScheduleRuleRepository, SemesterRepository,
    TimeSlotRepository,
};

/// 测试环境: 临时数据库 + 全套仓储与 API
pub struct TestEnv {
    // 临时文件需保持存活,析构即删除数据库
    pub _temp: NamedTempFile,
    pub schedule_api: Arc<ScheduleApi<ConfigManager>>,
    pub semester_api: Arc<SemesterApi>,
    pub rule_api: Arc<RuleApi>,
    pub semester_repo: Arc<SemesterRepository>,
    pub time_slot_repo: Arc<TimeSlotRepository>,
    pub member_repo: Arc<DutyMemberRepository>,
    pub location_repo: Arc<LocationRepository>,
    pub schedule_repo: Arc<ScheduleRepository>,
    pub item_repo: Arc<ScheduleItemRepository>,
    pub change_log_repo: Arc<ScheduleChangeLogRepository>,
    pub rule_repo: Arc<ScheduleRuleRepository>,
    pub config_manager: Arc<ConfigManager>,
}

/// 创建临时测试数据库并组装全套 API
pub fn setup_env() -> TestEnv {
    duty_roster::logging::init_test();

    let temp_file = NamedTempFile::new().expect("创建临时数据库失败");
    let db_path = temp_file.path().to_str().expect("临时路径无效").to_string();

    let conn = duty_roster::db::open_sqlite_connection(&db_path).expect("打开数据库失败");
    duty_roster::db::init_schema(&conn).expect("初始化schema失败");
    let conn = Arc::new(Mutex::new(conn));

    let semester_repo = Arc::new(SemesterRepository::new(conn.clone()));
    let time_slot_repo = Arc::new(TimeSlotRepository::new(conn.clone()));
    let member_repo = Arc::new(DutyMemberRepository::new(conn.clone()));
    let location_repo = Arc::new(LocationRepository::new(conn.clone()));
    let schedule_repo = Arc::new(ScheduleRepository::new(conn.clone()));
    let item_repo = Arc::new(ScheduleItemRepository::new(conn.clone()));
    let change_log_repo = Arc::new(ScheduleChangeLogRepository::new(conn.clone()));
    let rule_repo = Arc::new(ScheduleRuleRepository::new(conn.clone()));
    rule_repo.seed_builtin_rules().expect("播种规则失败");

    let config_manager =
        Arc::new(ConfigManager::from_connection(conn.clone()).expect("创建ConfigManager失败"));

    let schedule_api = Arc::new(ScheduleApi::new(
        semester_repo.clone(),
        time_slot_repo.clone(),
        member_repo.clone(),
        location_repo.clone(),
        schedule_repo.clone(),
        item_repo.clone(),
        change_log_repo.clone(),
        rule_repo.clone(),
        config_manager.clone(),
    ));

    let semester_api = Arc::new(SemesterApi::new(
        semester_repo.clone(),
        time_slot_repo.clone(),
        location_repo.clone(),
        member_repo.clone(),
        schedule_repo.clone(),
    ));

    let rule_api = Arc::new(RuleApi::new(rule_repo.clone()));

    TestEnv {
        _temp: temp_file,
        schedule_api,
        semester_api,
        rule_api,
        semester_repo,
        time_slot_repo,
        member_repo,
        location_repo,
        schedule_repo,
        item_repo,
        change_log_repo,
        rule_repo,
        config_manager,
    }
}

impl TestEnv {
    /// 播种一个处于排班阶段的激活学期,返回 semester_id
    pub fn seed_semester(&self, weeks: u32) -> String {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).expect("日期无效");
        let now = chrono::Utc::now().naive_utc();
        let semester = Semester {
            semester_id: "sem-test".to_string(),
            name: "2026春季学期".to_string(),
            start_date: start,
            end_date: start + chrono::Duration::days((weeks * 7 - 1) as i64),
            first_week_type: WeekParity::Odd,
            is_active: false,
            phase: SemesterPhase::Scheduling,
            created_at: now,
            updated_at: now,
            revision: 0,
        };
        self.semester_repo.create(&semester).expect("创建学期失败");
        self.semester_repo
            .activate(&semester.semester_id)
            .expect("激活学期失败");
        semester.semester_id
    }

    /// 播种时间段
    pub fn seed_slot(&self, semester_id: &str, id: &str, day: u8, start: &str, end: &str) {
        let slot = TimeSlot {
            time_slot_id: id.to_string(),
            name: format!("时段{}", id),
            semester_id: Some(semester_id.to_string()),
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_active: true,
        };
        self.time_slot_repo.create(&slot).expect("创建时间段失败");
    }

    /// 播种值班人员
    pub fn seed_member(&self, semester_id: &str, user_id: &str, dept: &str, submitted: bool) {
        let member = DutyMember {
            user_id: user_id.to_string(),
            semester_id: semester_id.to_string(),
            name: format!("成员{}", user_id),
            student_no: Some(format!("2023{}", user_id)),
            department_id: Some(dept.to_string()),
            department_name: Some(format!("部门{}", dept)),
            duty_required: true,
            timetable_status: if submitted {
                TimetableStatus::Submitted
            } else {
                TimetableStatus::NotSubmitted
            },
        };
        self.member_repo.upsert_member(&member).expect("写入人员失败");
    }

    /// 播种默认地点
    pub fn seed_location(&self, id: &str, name: &str) {
        let location = Location {
            location_id: id.to_string(),
            name: name.to_string(),
            is_default: true,
            is_active: true,
        };
        self.location_repo.create(&location).expect("创建地点失败");
    }

    /// 播种每周课程
    pub fn seed_course(
        &self,
        semester_id: &str,
        user_id: &str,
        day: u8,
        start: &str,
        end: &str,
        name: &str,
    ) {
        let course = CourseOccurrence {
            course_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            semester_id: semester_id.to_string(),
            course_name: name.to_string(),
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            week_type: WeekParity::All,
            repeat_type: RepeatType::Weekly,
            specific_date: None,
        };
        self.member_repo.insert_course(&course).expect("写入课程失败");
    }

    /// 播种每周不可用时间
    pub fn seed_unavailable(
        &self,
        semester_id: &str,
        user_id: &str,
        day: u8,
        start: &str,
        end: &str,
        reason: &str,
    ) {
        let entry = UnavailableEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            semester_id: semester_id.to_string(),
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            reason: Some(reason.to_string()),
            week_type: WeekParity::All,
            repeat_type: RepeatType::Weekly,
            specific_date: None,
        };
        self.member_repo
            .insert_unavailable(&entry)
            .expect("写入不可用时间失败");
    }

    /// 一键播种标准排班场景:
    /// 2周学期 / 周一+周三各2个时段 / 3名已提交课表的人员 / 1个默认地点
    pub fn seed_standard_scenario(&self) -> String {
        let semester_id = self.seed_semester(2);
        self.seed_slot(&semester_id, "mon-am", 1, "08:00", "09:00");
        self.seed_slot(&semester_id, "mon-pm", 1, "14:00", "15:00");
        self.seed_slot(&semester_id, "wed-am", 3, "08:00", "09:00");
        self.seed_slot(&semester_id, "wed-pm", 3, "14:00", "15:00");
        self.seed_member(&semester_id, "u1", "d1", true);
        self.seed_member(&semester_id, "u2", "d2", true);
        self.seed_member(&semester_id, "u3", "d3", true);
        self.seed_location("loc1", "值班室");
        semester_id
    }
}
