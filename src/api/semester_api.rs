// ==========================================
// 值班排班管理系统 - 学期 API
// ==========================================
// 职责: 学期管理与阶段状态机
// 阶段: CONFIGURING → COLLECTING → SCHEDULING → PUBLISHED
// - 前进只允许+1步且前置检查必须通过
// - 回退任意 (保留已有数据)
// - 阶段变更不触碰排班表实体
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::semester::Semester;
use crate::domain::types::{SemesterPhase, WeekParity};
use crate::i18n;
use crate::repository::{
    DutyMemberRepository, LocationRepository, ScheduleRepository, SemesterRepository,
    TimeSlotRepository,
};

// ==========================================
// 响应结构
// ==========================================

/// 单项阶段检查
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseCheckItem {
    pub label: String,
    pub passed: bool,
    pub message: Option<String>,
}

/// 阶段检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseCheckResult {
    pub current_phase: SemesterPhase,
    pub can_advance: bool,
    pub checks: Vec<PhaseCheckItem>,
}

// ==========================================
// SemesterApi - 学期 API
// ==========================================
pub struct SemesterApi {
    semester_repo: Arc<SemesterRepository>,
    time_slot_repo: Arc<TimeSlotRepository>,
    location_repo: Arc<LocationRepository>,
    member_repo: Arc<DutyMemberRepository>,
    schedule_repo: Arc<ScheduleRepository>,
}

impl SemesterApi {
    /// 创建新的SemesterApi实例
    pub fn new(
        semester_repo: Arc<SemesterRepository>,
        time_slot_repo: Arc<TimeSlotRepository>,
        location_repo: Arc<LocationRepository>,
        member_repo: Arc<DutyMemberRepository>,
        schedule_repo: Arc<ScheduleRepository>,
    ) -> Self {
        Self {
            semester_repo,
            time_slot_repo,
            location_repo,
            member_repo,
            schedule_repo,
        }
    }

    // ==========================================
    // 学期管理
    // ==========================================

    /// 创建学期 (初始阶段 CONFIGURING,不自动激活)
    pub fn create_semester(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        first_week_type: WeekParity,
    ) -> ApiResult<Semester> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("学期名称不能为空".to_string()));
        }
        if end_date <= start_date {
            return Err(ApiError::InvalidInput(format!(
                "学期结束日期必须晚于起始日期: {} / {}",
                start_date, end_date
            )));
        }
        if first_week_type == WeekParity::All {
            return Err(ApiError::InvalidInput(
                "first_week_type 只能为 ODD 或 EVEN".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let semester = Semester {
            semester_id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            start_date,
            end_date,
            first_week_type,
            is_active: false,
            phase: SemesterPhase::Configuring,
            created_at: now,
            updated_at: now,
            revision: 0,
        };

        self.semester_repo.create(&semester)?;
        info!(semester_id = %semester.semester_id, name = %semester.name, "学期已创建");

        Ok(semester)
    }

    /// 激活学期 (全局唯一激活)
    pub fn activate_semester(&self, semester_id: &str) -> ApiResult<()> {
        self.semester_repo.activate(semester_id)?;
        info!(semester_id, "学期已激活");
        Ok(())
    }

    /// 获取激活学期
    pub fn get_active_semester(&self) -> ApiResult<Option<Semester>> {
        Ok(self.semester_repo.find_active()?)
    }

    /// 获取学期详情
    pub fn get_semester(&self, semester_id: &str) -> ApiResult<Option<Semester>> {
        Ok(self.semester_repo.find_by_id(semester_id)?)
    }

    /// 查询全部学期
    pub fn list_semesters(&self) -> ApiResult<Vec<Semester>> {
        Ok(self.semester_repo.list_all()?)
    }

    // ==========================================
    // 阶段状态机
    // ==========================================

    /// 检查当前阶段能否前进,返回逐项检查清单
    pub fn check_phase(&self, semester_id: &str) -> ApiResult<PhaseCheckResult> {
        let semester = self
            .semester_repo
            .find_by_id(semester_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学期{}不存在", semester_id)))?;

        let mut result = PhaseCheckResult {
            current_phase: semester.phase,
            can_advance: true,
            checks: Vec::new(),
        };

        match semester.phase {
            SemesterPhase::Configuring => {
                // 检查: 至少1个时间段、至少1个地点、至少1名值班人员
                let time_slots = self.time_slot_repo.list_active_for_semester(semester_id)?;
                let locations = self.location_repo.list_active()?;
                let duty_count = self.member_repo.count_duty_required(semester_id)?;

                let mut ts_check = PhaseCheckItem {
                    label: "时间段配置".to_string(),
                    passed: !time_slots.is_empty(),
                    message: None,
                };
                if !ts_check.passed {
                    ts_check.message = Some(i18n::t("semester.need_time_slot"));
                    result.can_advance = false;
                }
                result.checks.push(ts_check);

                let mut loc_check = PhaseCheckItem {
                    label: "地点配置".to_string(),
                    passed: !locations.is_empty(),
                    message: None,
                };
                if !loc_check.passed {
                    loc_check.message = Some(i18n::t("semester.need_location"));
                    result.can_advance = false;
                }
                result.checks.push(loc_check);

                let mut duty_check = PhaseCheckItem {
                    label: "值班人员".to_string(),
                    passed: duty_count > 0,
                    message: None,
                };
                if !duty_check.passed {
                    duty_check.message = Some(i18n::t("semester.need_duty_member"));
                    result.can_advance = false;
                }
                result.checks.push(duty_check);
            }

            SemesterPhase::Collecting => {
                // 检查: 所有值班人员已提交课表
                let total = self.member_repo.count_duty_required(semester_id)?;
                let submitted = self.member_repo.count_duty_required_submitted(semester_id)?;

                let mut check = PhaseCheckItem {
                    label: "课表提交".to_string(),
                    passed: total > 0 && submitted == total,
                    message: None,
                };
                if !check.passed {
                    check.message = Some(i18n::t_with_args(
                        "semester.submission_progress",
                        &[("submitted", &submitted.to_string()), ("total", &total.to_string())],
                    ));
                    result.can_advance = false;
                }
                result.checks.push(check);
            }

            SemesterPhase::Scheduling => {
                // 检查: 存在排班表
                let schedule = self.schedule_repo.find_by_semester(semester_id)?;
                let mut check = PhaseCheckItem {
                    label: "排班表".to_string(),
                    passed: schedule.is_some(),
                    message: None,
                };
                if !check.passed {
                    check.message = Some(i18n::t("semester.need_schedule"));
                    result.can_advance = false;
                }
                result.checks.push(check);
            }

            SemesterPhase::Published => {
                // 已发布,无需推进
                result.can_advance = false;
            }
        }

        Ok(result)
    }

    /// 阶段跳转: 回退任意,前进只允许+1步且检查必须通过
    #[instrument(skip(self), fields(semester_id = %semester_id, target = %target_phase))]
    pub fn advance_phase(
        &self,
        semester_id: &str,
        target_phase: SemesterPhase,
    ) -> ApiResult<Semester> {
        let mut semester = self
            .semester_repo
            .find_by_id(semester_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学期{}不存在", semester_id)))?;

        let current_idx = semester.phase.index();
        let target_idx = target_phase.index();

        // 回退: 任意阶段可回退到前序阶段,保留已有数据
        if target_idx < current_idx {
            semester.phase = target_phase;
            self.semester_repo.update(&semester)?;
            info!(semester_id, phase = %target_phase, "学期阶段已回退");
            return self
                .semester_repo
                .find_by_id(semester_id)?
                .ok_or_else(|| ApiError::NotFound(format!("学期{}不存在", semester_id)));
        }

        // 前进只允许+1步
        if target_idx != current_idx + 1 {
            return Err(ApiError::InvalidPhaseTransition {
                from: semester.phase.to_string(),
                to: target_phase.to_string(),
            });
        }

        // 前进需检查条件
        let check = self.check_phase(semester_id)?;
        if !check.can_advance {
            return Err(ApiError::PhasePreconditionFailed);
        }

        semester.phase = target_phase;
        self.semester_repo.update(&semester)?;
        info!(semester_id, phase = %target_phase, "学期阶段已推进");

        self.semester_repo
            .find_by_id(semester_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学期{}不存在", semester_id)))
    }
}
