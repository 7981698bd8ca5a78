// ==========================================
// 值班排班管理系统 - 排班规则 API
// ==========================================
// 职责: 规则目录查询与启用状态管理
// 红线: is_configurable=false 的规则拒绝任何配置修改
// ==========================================

use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::rule::ScheduleRule;
use crate::repository::ScheduleRuleRepository;

// ==========================================
// RuleApi - 排班规则 API
// ==========================================
pub struct RuleApi {
    rule_repo: Arc<ScheduleRuleRepository>,
}

impl RuleApi {
    /// 创建新的RuleApi实例
    pub fn new(rule_repo: Arc<ScheduleRuleRepository>) -> Self {
        Self { rule_repo }
    }

    /// 查询全部规则
    pub fn list_rules(&self) -> ApiResult<Vec<ScheduleRule>> {
        Ok(self.rule_repo.list_all()?)
    }

    /// 查询规则详情
    pub fn get_rule(&self, rule_id: &str) -> ApiResult<ScheduleRule> {
        self.rule_repo
            .find_by_id(rule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班规则{}不存在", rule_id)))
    }

    /// 更新规则启用状态
    ///
    /// # 错误
    /// - `RuleNotConfigurable`: 核心规则不可配置
    #[instrument(skip(self), fields(rule_id = %rule_id, operator = %operator))]
    pub fn update_rule(
        &self,
        rule_id: &str,
        is_enabled: bool,
        operator: &str,
    ) -> ApiResult<ScheduleRule> {
        let rule = self
            .rule_repo
            .find_by_id(rule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班规则{}不存在", rule_id)))?;

        // 检查规则是否可配置
        if !rule.is_configurable {
            return Err(ApiError::RuleNotConfigurable(rule.rule_code));
        }

        self.rule_repo.set_enabled(rule_id, is_enabled)?;
        info!(rule_id, is_enabled, operator, "排班规则启用状态已更新");

        self.rule_repo
            .find_by_id(rule_id)?
            .ok_or_else(|| ApiError::NotFound(format!("排班规则{}不存在", rule_id)))
    }
}
