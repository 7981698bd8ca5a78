// ==========================================
// 值班排班管理系统 - 排班 API
// ==========================================
// 职责: 自动排班 / 排班表生命周期 / 候选人查询 / 审计与范围检测
// 生命周期红线:
// - DRAFT → PUBLISHED 单向,已发布不可重新生成、不可撤回
// - 草稿期修改自由且不留审计;发布后修改必须填写原因并写入变更日志
// 并发红线:
// - 同学期 auto_schedule 串行化 (学期级锁),草稿整体替换在事务中完成
// - 发布与条目更新依赖 revision 乐观锁,冲突以可重试错误返回
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ScheduleConfigReader;
use crate::domain::change_log::ScheduleChangeLog;
use crate::domain::member::{DutyMember, Location, MemberBrief};
use crate::domain::schedule::{Schedule, ScheduleItem, ScheduleItemView};
use crate::domain::semester::TimeSlot;
use crate::domain::types::{ChangeType, ScheduleStatus};
use crate::engine::assigner::{AssignmentEngine, AssignmentInputs};
use crate::engine::availability::{AvailabilityResolver, IntervalKind};
use crate::engine::rules::{RuleKind, RuleSet};
use crate::i18n;
use crate::repository::{
    DutyMemberRepository, LocationRepository, ScheduleChangeLogRepository,
    ScheduleItemRepository, ScheduleRepository, ScheduleRuleRepository, SemesterRepository,
    TimeSlotRepository,
};

// ==========================================
// 响应结构
// ==========================================

/// 排班表完整视图 (含明细)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleView {
    pub schedule_id: String,
    pub semester_id: String,
    pub status: ScheduleStatus,
    pub published_at: Option<String>,
    pub items: Vec<ScheduleItemView>,
}

/// 自动排班结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScheduleResult {
    pub schedule: ScheduleView,
    pub total_slots: u32,
    pub filled_slots: u32,
    pub warnings: Vec<String>,
}

/// 候选人视图 (带可用性与冲突原因)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateView {
    pub member: MemberBrief,
    pub available: bool,
    pub conflicts: Vec<String>,
}

/// 候选人校验结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateCandidateResult {
    pub valid: bool,
    pub conflicts: Vec<String>,
}

/// 范围检测结果 (只读,不落库)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeCheckResult {
    pub changed: bool,
    pub added_users: Vec<String>,
    pub removed_users: Vec<String>,
}

/// 变更日志分页
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLogPage {
    pub logs: Vec<ScheduleChangeLog>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

// ==========================================
// ScheduleApi - 排班 API
// ==========================================
pub struct ScheduleApi<C>
where
    C: ScheduleConfigReader,
{
    semester_repo: Arc<SemesterRepository>,
    time_slot_repo: Arc<TimeSlotRepository>,
    member_repo: Arc<DutyMemberRepository>,
    location_repo: Arc<LocationRepository>,
    schedule_repo: Arc<ScheduleRepository>,
    item_repo: Arc<ScheduleItemRepository>,
    change_log_repo: Arc<ScheduleChangeLogRepository>,
    rule_repo: Arc<ScheduleRuleRepository>,
    config: Arc<C>,
    engine: AssignmentEngine,
    // 学期级排班锁: 同学期并发 auto_schedule 串行执行,后到者等待并整体覆盖
    run_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<C> ScheduleApi<C>
where
    C: ScheduleConfigReader,
{
    /// 创建新的ScheduleApi实例
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semester_repo: Arc<SemesterRepository>,
        time_slot_repo: Arc<TimeSlotRepository>,
        member_repo: Arc<DutyMemberRepository>,
        location_repo: Arc<LocationRepository>,
        schedule_repo: Arc<ScheduleRepository>,
        item_repo: Arc<ScheduleItemRepository>,
        change_log_repo: Arc<ScheduleChangeLogRepository>,
        rule_repo: Arc<ScheduleRuleRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            semester_repo,
            time_slot_repo,
            member_repo,
            location_repo,
            schedule_repo,
            item_repo,
            change_log_repo,
            rule_repo,
            config,
            engine: AssignmentEngine::new(),
            run_locks: Mutex::new(HashMap::new()),
        }
    }

    // ==========================================
    // 自动排班
    // ==========================================

    /// 执行自动排班,产出草稿排班表
    ///
    /// # 前置条件
    /// - 学期存在且配置了启用时间段/启用地点/值班人员
    /// - 课表提交率 100%
    /// - 该学期无已发布排班表 (已有草稿则整体替换)
    ///
    /// # 并发
    /// 同学期调用串行化;等待者在前者完成后重新生成并整体覆盖草稿。
    #[instrument(skip(self), fields(semester_id = %semester_id, operator = %operator))]
    pub async fn auto_schedule(
        &self,
        semester_id: &str,
        operator: &str,
    ) -> ApiResult<AutoScheduleResult> {
        if semester_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("学期ID不能为空".to_string()));
        }
        if operator.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        // 学期级串行化
        let lock = self.semester_lock(semester_id)?;
        let _guard = lock.lock().await;

        // 0. 校验学期
        let semester = self
            .semester_repo
            .find_by_id(semester_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学期{}不存在", semester_id)))?;

        // 0.1 已发布排班表不可重新生成
        if let Some(existing) = self.schedule_repo.find_by_semester(semester_id)? {
            if existing.is_published() {
                return Err(ApiError::ScheduleAlreadyPublished(existing.schedule_id));
            }
        }

        // ── 阶段1: 前置条件检查 ──

        let slots = self.time_slot_repo.list_active_for_semester(semester_id)?;
        if slots.is_empty() {
            return Err(ApiError::NoActiveTimeSlots(semester_id.to_string()));
        }

        let locations = self.location_repo.list_active()?;
        if locations.is_empty() {
            return Err(ApiError::NoActiveLocations);
        }

        let total_required = self.member_repo.count_duty_required(semester_id)?;
        if total_required == 0 {
            return Err(ApiError::NoDutyMembers(semester_id.to_string()));
        }
        let total_submitted = self.member_repo.count_duty_required_submitted(semester_id)?;
        if total_submitted < total_required {
            return Err(ApiError::SubmissionIncomplete {
                submitted: total_submitted,
                total: total_required,
            });
        }

        let candidates = self.member_repo.list_eligible(semester_id)?;
        if candidates.is_empty() {
            return Err(ApiError::NoCandidates(semester_id.to_string()));
        }

        // ── 阶段2: 构建求解输入 ──

        let courses = self.member_repo.list_courses_by_semester(semester_id)?;
        let unavailables = self.member_repo.list_unavailable_by_semester(semester_id)?;
        let resolver = AvailabilityResolver::new(&semester, &courses, &unavailables);

        let rules = self.rule_repo.list_all()?;
        let rule_set = RuleSet::from_rules(&rules);

        let early_slot_threshold = self
            .config
            .get_early_slot_threshold()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取早班阈值配置失败: {}", e)))?;
        let timeout_ms = self
            .config
            .get_solver_timeout_ms()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取求解超时配置失败: {}", e)))?;

        // ── 阶段3: 求解 ──

        let outcome = self.engine.run(&AssignmentInputs {
            semester: &semester,
            slots: &slots,
            candidates: &candidates,
            resolver: &resolver,
            rule_set: &rule_set,
            early_slot_threshold: &early_slot_threshold,
            budget: Duration::from_millis(timeout_ms),
        })?;

        // ── 阶段4: 落库 (整体替换旧草稿) ──

        let now = chrono::Utc::now().naive_utc();
        let schedule = Schedule {
            schedule_id: uuid::Uuid::new_v4().to_string(),
            semester_id: semester_id.to_string(),
            status: ScheduleStatus::Draft,
            published_at: None,
            created_by: Some(operator.to_string()),
            created_at: now,
            updated_at: now,
            revision: 0,
        };

        let items: Vec<ScheduleItem> = outcome
            .cells
            .iter()
            .map(|cell| ScheduleItem {
                schedule_item_id: uuid::Uuid::new_v4().to_string(),
                schedule_id: schedule.schedule_id.clone(),
                week_number: cell.week_number,
                time_slot_id: cell.time_slot_id.clone(),
                member_id: cell.member_id.clone(),
                location_id: None,
            })
            .collect();

        self.schedule_repo.replace_for_semester(&schedule, &items)?;

        if !outcome.warnings.is_empty() {
            warn!(
                semester_id,
                unfilled = outcome.warnings.len(),
                "自动排班存在空缺格"
            );
        }
        info!(
            semester_id,
            schedule_id = %schedule.schedule_id,
            total = outcome.total_slots,
            filled = outcome.filled_slots,
            "自动排班草稿已生成"
        );

        let view = self.build_schedule_view(&schedule)?;
        Ok(AutoScheduleResult {
            schedule: view,
            total_slots: outcome.total_slots,
            filled_slots: outcome.filled_slots,
            warnings: outcome.warnings,
        })
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 获取排班表 (semester_id 为 None 时取激活学期;无排班表返回 None)
    pub fn get_schedule(&self, semester_id: Option<&str>) -> ApiResult<Option<ScheduleView>> {
        let semester_id = match semester_id {
            Some(id) => id.to_string(),
            None => self
                .semester_repo
                .find_active()?
                .ok_or(ApiError::NoActiveSemester)?
                .semester_id,
        };

        match self.schedule_repo.find_by_semester(&semester_id)? {
            Some(schedule) => Ok(Some(self.build_schedule_view(&schedule)?)),
            None => Ok(None),
        }
    }

    /// 获取指定人员自己的排班项
    pub fn get_my_schedule(
        &self,
        semester_id: &str,
        user_id: &str,
    ) -> ApiResult<Vec<ScheduleItemView>> {
        let schedule = self
            .schedule_repo
            .find_by_semester(semester_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学期{}无排班表", semester_id)))?;

        let items = self
            .item_repo
            .find_by_schedule_and_member(&schedule.schedule_id, user_id)?;

        let ctx = self.view_context(&schedule.semester_id)?;
        Ok(items.iter().map(|item| ctx.to_view(item)).collect())
    }

    // ==========================================
    // 草稿期调整
    // ==========================================

    /// 手动调整草稿排班项 (人员/地点),不写审计日志
    #[instrument(skip(self), fields(item_id = %item_id, operator = %operator))]
    pub fn update_item(
        &self,
        item_id: &str,
        member_id: Option<&str>,
        location_id: Option<&str>,
        operator: &str,
    ) -> ApiResult<ScheduleItemView> {
        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班项{}不存在", item_id)))?;

        let schedule = self
            .schedule_repo
            .find_by_id(&item.schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", item.schedule_id)))?;
        if !schedule.is_draft() {
            return Err(ApiError::ScheduleNotDraft(schedule.schedule_id));
        }

        let new_member = member_id
            .map(|m| m.to_string())
            .or_else(|| item.member_id.clone());
        let new_location = location_id
            .map(|l| l.to_string())
            .or_else(|| item.location_id.clone());

        self.item_repo.update_assignment(
            item_id,
            new_member.as_deref(),
            new_location.as_deref(),
        )?;

        let updated = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班项{}不存在", item_id)))?;
        let ctx = self.view_context(&schedule.semester_id)?;
        Ok(ctx.to_view(&updated))
    }

    // ==========================================
    // 发布
    // ==========================================

    /// 发布排班表 (仅草稿可发布,发布后不可撤回)
    #[instrument(skip(self), fields(schedule_id = %schedule_id, operator = %operator))]
    pub async fn publish(&self, schedule_id: &str, operator: &str) -> ApiResult<ScheduleView> {
        let mut schedule = self
            .schedule_repo
            .find_by_id(schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", schedule_id)))?;

        if schedule.is_published() {
            return Err(ApiError::ScheduleAlreadyPublished(schedule_id.to_string()));
        }

        // 填充率发布门槛 (0 表示不限制)
        let required_pct = self
            .config
            .get_publish_min_fill_pct()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取发布门槛配置失败: {}", e)))?;
        if required_pct > 0 {
            let (total, filled) = self.item_repo.count_fill(schedule_id)?;
            if total == 0 || filled * 100 < required_pct as i64 * total {
                return Err(ApiError::FillRateInsufficient {
                    filled,
                    total,
                    required_pct,
                });
            }
        }

        schedule.status = ScheduleStatus::Published;
        schedule.published_at = Some(chrono::Utc::now().naive_utc());
        self.schedule_repo.update(&schedule)?;

        info!(schedule_id, operator, "排班表已发布");

        // 重新读取以获得发布后的 revision
        let published = self
            .schedule_repo
            .find_by_id(schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", schedule_id)))?;
        self.build_schedule_view(&published)
    }

    // ==========================================
    // 发布后调整 (审计)
    // ==========================================

    /// 发布后修改排班项: 必须填写原因,成功后精确写入一条变更日志
    #[instrument(skip(self, reason), fields(item_id = %item_id, operator = %operator))]
    pub fn update_published_item(
        &self,
        item_id: &str,
        member_id: &str,
        reason: &str,
        operator: &str,
    ) -> ApiResult<ScheduleItemView> {
        if reason.trim().is_empty() {
            return Err(ApiError::ReasonRequired);
        }
        if member_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("人员ID不能为空".to_string()));
        }

        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班项{}不存在", item_id)))?;

        let schedule = self
            .schedule_repo
            .find_by_id(&item.schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", item.schedule_id)))?;
        if !schedule.is_published() {
            return Err(ApiError::ScheduleNotPublished(schedule.schedule_id));
        }

        // 新候选人必须通过硬规则
        let conflicts = self.candidate_conflicts(member_id, &schedule, &item)?;
        if !conflicts.is_empty() {
            return Err(ApiError::CandidateNotAvailable { conflicts });
        }

        // 记录变更日志 (发布后修改必审计)
        let log = ScheduleChangeLog::new(
            schedule.schedule_id.clone(),
            item.schedule_item_id.clone(),
            item.member_id.clone(),
            member_id.to_string(),
            ChangeType::PublishedModify,
            reason.trim().to_string(),
            operator.to_string(),
        );
        self.change_log_repo.insert(&log)?;

        // 更新排班项
        self.item_repo
            .update_assignment(item_id, Some(member_id), item.location_id.as_deref())?;

        info!(
            item_id,
            original = ?item.member_id,
            new_member = member_id,
            "发布后改派已记录审计日志"
        );

        let updated = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班项{}不存在", item_id)))?;
        let ctx = self.view_context(&schedule.semester_id)?;
        Ok(ctx.to_view(&updated))
    }

    /// 分页查询变更日志 (最新在前)
    pub fn list_change_logs(
        &self,
        schedule_id: &str,
        page: u32,
        page_size: u32,
    ) -> ApiResult<ChangeLogPage> {
        if page_size == 0 || page_size > 200 {
            return Err(ApiError::InvalidInput(format!(
                "page_size必须在1-200之间: {}",
                page_size
            )));
        }

        let (logs, total) = self
            .change_log_repo
            .list_by_schedule(schedule_id, page, page_size)?;

        Ok(ChangeLogPage {
            logs,
            total,
            page: page.max(1),
            page_size,
        })
    }

    // ==========================================
    // 候选人
    // ==========================================

    /// 获取排班项的全部候选人 (带可用性与冲突原因)
    pub fn get_candidates(&self, item_id: &str) -> ApiResult<Vec<CandidateView>> {
        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班项{}不存在", item_id)))?;

        let schedule = self
            .schedule_repo
            .find_by_id(&item.schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", item.schedule_id)))?;

        let members = self.member_repo.list_eligible(&schedule.semester_id)?;
        let mut result = Vec::with_capacity(members.len());
        for member in &members {
            let conflicts = self.candidate_conflicts(&member.user_id, &schedule, &item)?;
            result.push(CandidateView {
                member: member.brief(),
                available: conflicts.is_empty(),
                conflicts,
            });
        }

        Ok(result)
    }

    /// 校验单个候选人能否指派到排班项
    pub fn validate_candidate(
        &self,
        item_id: &str,
        member_id: &str,
    ) -> ApiResult<ValidateCandidateResult> {
        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班项{}不存在", item_id)))?;

        let schedule = self
            .schedule_repo
            .find_by_id(&item.schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", item.schedule_id)))?;

        let conflicts = self.candidate_conflicts(member_id, &schedule, &item)?;
        Ok(ValidateCandidateResult {
            valid: conflicts.is_empty(),
            conflicts,
        })
    }

    // ==========================================
    // 范围检测
    // ==========================================

    /// 范围变更检测: 当前值班名单 vs 排班表引用到的人员
    ///
    /// 只读操作,仅提示不阻断;变更不会触发任何状态修改。
    pub fn check_scope(&self, schedule_id: &str) -> ApiResult<ScopeCheckResult> {
        let schedule = self
            .schedule_repo
            .find_by_id(schedule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班表{}不存在", schedule_id)))?;

        let current_members = self.member_repo.list_duty_required(&schedule.semester_id)?;
        let referenced_ids = self.item_repo.list_distinct_member_ids(schedule_id)?;

        let current_ids: HashMap<&str, &DutyMember> = current_members
            .iter()
            .map(|m| (m.user_id.as_str(), m))
            .collect();

        // 新增: 当前名单有而排班表未引用
        let mut added_users: Vec<String> = current_members
            .iter()
            .filter(|m| !referenced_ids.iter().any(|id| id == &m.user_id))
            .map(|m| m.name.clone())
            .collect();
        added_users.sort();

        // 移除: 排班表引用了但已不在当前名单
        let mut removed_users: Vec<String> = referenced_ids
            .iter()
            .filter(|id| !current_ids.contains_key(id.as_str()))
            .cloned()
            .collect();
        removed_users.sort();

        Ok(ScopeCheckResult {
            changed: !added_users.is_empty() || !removed_users.is_empty(),
            added_users,
            removed_users,
        })
    }

    // ==========================================
    // 内部辅助方法
    // ==========================================

    /// 取学期级排班锁
    fn semester_lock(&self, semester_id: &str) -> ApiResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .run_locks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("排班锁获取失败: {}", e)))?;
        Ok(locks
            .entry(semester_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    /// 检查候选人在排班项时段的冲突 (R1/R2 按启用状态,R6 始终检查)
    fn candidate_conflicts(
        &self,
        member_id: &str,
        schedule: &Schedule,
        item: &ScheduleItem,
    ) -> ApiResult<Vec<String>> {
        let semester = self
            .semester_repo
            .find_by_id(&schedule.semester_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学期{}不存在", schedule.semester_id)))?;
        let slot = self
            .time_slot_repo
            .find_by_id(&item.time_slot_id)?
            .ok_or_else(|| ApiError::NotFound(format!("时间段{}不存在", item.time_slot_id)))?;

        let rules = self.rule_repo.list_all()?;
        let rule_set = RuleSet::from_rules(&rules);

        let courses = self
            .member_repo
            .list_courses_by_user(&schedule.semester_id, member_id)?;
        let unavailables = self
            .member_repo
            .list_unavailable_by_user(&schedule.semester_id, member_id)?;
        let resolver = AvailabilityResolver::new(&semester, &courses, &unavailables);

        let mut conflicts = Vec::new();

        // R1: 课程冲突
        if rule_set.is_enabled(RuleKind::CourseConflict) {
            conflicts.extend(resolver.collect_conflicts(
                member_id,
                item.week_number,
                &slot,
                Some(IntervalKind::Course),
            ));
        }

        // R2: 不可用时间
        if rule_set.is_enabled(RuleKind::UnavailableTime) {
            conflicts.extend(resolver.collect_conflicts(
                member_id,
                item.week_number,
                &slot,
                Some(IntervalKind::Declared),
            ));
        }

        // R6: 同人同日不重复 (核心规则,始终检查)
        let all_items = self.item_repo.find_by_schedule(&schedule.schedule_id)?;
        let slot_days = self.slot_day_map(&schedule.semester_id)?;
        let same_day = all_items.iter().any(|other| {
            other.schedule_item_id != item.schedule_item_id
                && other.member_id.as_deref() == Some(member_id)
                && other.week_number == item.week_number
                && slot_days.get(&other.time_slot_id) == slot_days.get(&item.time_slot_id)
                && slot_days.contains_key(&other.time_slot_id)
        });
        if same_day {
            conflicts.push(i18n::t("schedule.same_day_repeat"));
        }

        Ok(conflicts)
    }

    /// time_slot_id → day_of_week 映射
    fn slot_day_map(&self, semester_id: &str) -> ApiResult<HashMap<String, u8>> {
        let slots = self.time_slot_repo.list_active_for_semester(semester_id)?;
        Ok(slots
            .into_iter()
            .map(|s| (s.time_slot_id, s.day_of_week))
            .collect())
    }

    /// 构建排班表完整视图
    fn build_schedule_view(&self, schedule: &Schedule) -> ApiResult<ScheduleView> {
        let items = self.item_repo.find_by_schedule(&schedule.schedule_id)?;
        let ctx = self.view_context(&schedule.semester_id)?;

        Ok(ScheduleView {
            schedule_id: schedule.schedule_id.clone(),
            semester_id: schedule.semester_id.clone(),
            status: schedule.status,
            published_at: schedule
                .published_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            items: items.iter().map(|item| ctx.to_view(item)).collect(),
        })
    }

    /// 构建视图所需的关联数据映射
    fn view_context(&self, semester_id: &str) -> ApiResult<ViewContext> {
        let slots = self.time_slot_repo.list_active_for_semester(semester_id)?;
        let members = self.member_repo.list_duty_required(semester_id)?;
        let locations = self.location_repo.list_active()?;

        Ok(ViewContext {
            slots: slots.into_iter().map(|s| (s.time_slot_id.clone(), s)).collect(),
            members: members.into_iter().map(|m| (m.user_id.clone(), m)).collect(),
            locations: locations
                .into_iter()
                .map(|l| (l.location_id.clone(), l))
                .collect(),
        })
    }
}

// ==========================================
// ViewContext - 视图构建上下文
// ==========================================
struct ViewContext {
    slots: HashMap<String, TimeSlot>,
    members: HashMap<String, DutyMember>,
    locations: HashMap<String, Location>,
}

impl ViewContext {
    fn to_view(&self, item: &ScheduleItem) -> ScheduleItemView {
        let slot = self.slots.get(&item.time_slot_id);
        let member = item
            .member_id
            .as_ref()
            .and_then(|id| self.members.get(id))
            .map(|m| m.brief());
        let location_name = item
            .location_id
            .as_ref()
            .and_then(|id| self.locations.get(id))
            .map(|l| l.name.clone());

        ScheduleItemView {
            schedule_item_id: item.schedule_item_id.clone(),
            schedule_id: item.schedule_id.clone(),
            week_number: item.week_number,
            time_slot_id: item.time_slot_id.clone(),
            time_slot_name: slot.map(|s| s.name.clone()),
            day_of_week: slot.map(|s| s.day_of_week),
            start_time: slot.map(|s| s.start_time.clone()),
            end_time: slot.map(|s| s.end_time.clone()),
            member,
            location_id: item.location_id.clone(),
            location_name,
        }
    }
}
