// ==========================================
// 值班排班管理系统 - Tauri 命令层
// ==========================================
// 职责: 把 API 层操作暴露为 Tauri 命令
// 错误约定: 统一返回 "错误码: 错误消息" 字符串,前端按码映射文案
// ==========================================

use chrono::NaiveDate;
use tauri::State;

use crate::api::error::ApiError;
use crate::api::{
    AutoScheduleResult, CandidateView, ChangeLogPage, PhaseCheckResult, ScheduleView,
    ScopeCheckResult, ValidateCandidateResult,
};
use crate::app::AppState;
use crate::domain::rule::ScheduleRule;
use crate::domain::schedule::ScheduleItemView;
use crate::domain::semester::Semester;
use crate::domain::types::{SemesterPhase, WeekParity};

/// ApiError → 前端错误字符串
fn to_command_error(err: ApiError) -> String {
    format!("{}: {}", err.code(), err)
}

// ==========================================
// 排班命令
// ==========================================

#[tauri::command]
pub async fn auto_schedule(
    state: State<'_, AppState>,
    semester_id: String,
    operator: String,
) -> Result<AutoScheduleResult, String> {
    state
        .schedule_api
        .auto_schedule(&semester_id, &operator)
        .await
        .map_err(to_command_error)
}

#[tauri::command]
pub fn get_schedule(
    state: State<'_, AppState>,
    semester_id: Option<String>,
) -> Result<Option<ScheduleView>, String> {
    state
        .schedule_api
        .get_schedule(semester_id.as_deref())
        .map_err(to_command_error)
}

#[tauri::command]
pub fn get_my_schedule(
    state: State<'_, AppState>,
    semester_id: String,
    user_id: String,
) -> Result<Vec<ScheduleItemView>, String> {
    state
        .schedule_api
        .get_my_schedule(&semester_id, &user_id)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn update_item(
    state: State<'_, AppState>,
    item_id: String,
    member_id: Option<String>,
    location_id: Option<String>,
    operator: String,
) -> Result<ScheduleItemView, String> {
    state
        .schedule_api
        .update_item(&item_id, member_id.as_deref(), location_id.as_deref(), &operator)
        .map_err(to_command_error)
}

#[tauri::command]
pub async fn publish_schedule(
    state: State<'_, AppState>,
    schedule_id: String,
    operator: String,
) -> Result<ScheduleView, String> {
    state
        .schedule_api
        .publish(&schedule_id, &operator)
        .await
        .map_err(to_command_error)
}

#[tauri::command]
pub fn update_published_item(
    state: State<'_, AppState>,
    item_id: String,
    member_id: String,
    reason: String,
    operator: String,
) -> Result<ScheduleItemView, String> {
    state
        .schedule_api
        .update_published_item(&item_id, &member_id, &reason, &operator)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn list_change_logs(
    state: State<'_, AppState>,
    schedule_id: String,
    page: u32,
    page_size: u32,
) -> Result<ChangeLogPage, String> {
    state
        .schedule_api
        .list_change_logs(&schedule_id, page, page_size)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn check_scope(
    state: State<'_, AppState>,
    schedule_id: String,
) -> Result<ScopeCheckResult, String> {
    state
        .schedule_api
        .check_scope(&schedule_id)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn get_candidates(
    state: State<'_, AppState>,
    item_id: String,
) -> Result<Vec<CandidateView>, String> {
    state
        .schedule_api
        .get_candidates(&item_id)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn validate_candidate(
    state: State<'_, AppState>,
    item_id: String,
    member_id: String,
) -> Result<ValidateCandidateResult, String> {
    state
        .schedule_api
        .validate_candidate(&item_id, &member_id)
        .map_err(to_command_error)
}

// ==========================================
// 学期命令
// ==========================================

#[tauri::command]
pub fn create_semester(
    state: State<'_, AppState>,
    name: String,
    start_date: String,
    end_date: String,
    first_week_type: String,
) -> Result<Semester, String> {
    let start = NaiveDate::parse_from_str(&start_date, "%Y-%m-%d")
        .map_err(|e| format!("INVALID_INPUT: 起始日期无效: {}", e))?;
    let end = NaiveDate::parse_from_str(&end_date, "%Y-%m-%d")
        .map_err(|e| format!("INVALID_INPUT: 结束日期无效: {}", e))?;

    state
        .semester_api
        .create_semester(&name, start, end, WeekParity::from_str(&first_week_type))
        .map_err(to_command_error)
}

#[tauri::command]
pub fn activate_semester(state: State<'_, AppState>, semester_id: String) -> Result<(), String> {
    state
        .semester_api
        .activate_semester(&semester_id)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn list_semesters(state: State<'_, AppState>) -> Result<Vec<Semester>, String> {
    state.semester_api.list_semesters().map_err(to_command_error)
}

#[tauri::command]
pub fn get_active_semester(state: State<'_, AppState>) -> Result<Option<Semester>, String> {
    state
        .semester_api
        .get_active_semester()
        .map_err(to_command_error)
}

#[tauri::command]
pub fn check_phase(
    state: State<'_, AppState>,
    semester_id: String,
) -> Result<PhaseCheckResult, String> {
    state
        .semester_api
        .check_phase(&semester_id)
        .map_err(to_command_error)
}

#[tauri::command]
pub fn advance_phase(
    state: State<'_, AppState>,
    semester_id: String,
    target_phase: String,
) -> Result<Semester, String> {
    state
        .semester_api
        .advance_phase(&semester_id, SemesterPhase::from_str(&target_phase))
        .map_err(to_command_error)
}

// ==========================================
// 规则命令
// ==========================================

#[tauri::command]
pub fn list_rules(state: State<'_, AppState>) -> Result<Vec<ScheduleRule>, String> {
    state.rule_api.list_rules().map_err(to_command_error)
}

#[tauri::command]
pub fn update_rule(
    state: State<'_, AppState>,
    rule_id: String,
    is_enabled: bool,
    operator: String,
) -> Result<ScheduleRule, String> {
    state
        .rule_api
        .update_rule(&rule_id, is_enabled, &operator)
        .map_err(to_command_error)
}
