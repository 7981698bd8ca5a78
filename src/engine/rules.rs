// ==========================================
// 值班排班管理系统 - 约束规则集
// ==========================================
// 规则目录为封闭枚举 (R1-R7),统一通过 evaluate 分发:
// 硬规则返回 Veto (候选人出局),软规则返回罚分 (越低越优)
// 停用的规则整体跳过,不参与计分;
// is_configurable=false 的规则 (R6/R7) 始终参与
// ==========================================

use crate::domain::rule::ScheduleRule;
use crate::domain::semester::TimeSlot;
use crate::i18n;
use std::collections::{HashMap, HashSet};

// ==========================================
// RuleOutcome - 规则评估结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// 硬否决,候选人不可用于该格
    Veto { reason: String },
    /// 软罚分 (0 表示无影响)
    Score(i32),
}

// ==========================================
// Candidate - 待评估候选人
// ==========================================
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub user_id: &'a str,
    pub department_id: Option<&'a str>,
}

// ==========================================
// AssignmentTracker - 已排部分的累计状态
// ==========================================
// 求解循环逐格推进,规则只读取此前已落定的指派
#[derive(Debug, Default)]
pub struct AssignmentTracker {
    /// user_id → 已排班次数
    assigned_count: HashMap<String, u32>,
    /// (user_id, week, day_of_week) 已排集合
    member_day: HashSet<(String, u32, u8)>,
    /// (week, day_of_week, department_id) 已排集合
    day_department: HashSet<(u32, u8, String)>,
    /// (week, time_slot_id) → department_id
    slot_department: HashMap<(u32, String), String>,
}

impl AssignmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次指派
    pub fn record(
        &mut self,
        user_id: &str,
        department_id: Option<&str>,
        week: u32,
        slot: &TimeSlot,
    ) {
        *self.assigned_count.entry(user_id.to_string()).or_insert(0) += 1;
        self.member_day
            .insert((user_id.to_string(), week, slot.day_of_week));
        if let Some(dept) = department_id {
            self.day_department
                .insert((week, slot.day_of_week, dept.to_string()));
            self.slot_department
                .insert((week, slot.time_slot_id.clone()), dept.to_string());
        }
    }

    /// 当前已排班次数
    pub fn assigned_count(&self, user_id: &str) -> u32 {
        self.assigned_count.get(user_id).copied().unwrap_or(0)
    }

    /// 同人同日是否已排
    pub fn member_on_day(&self, user_id: &str, week: u32, day_of_week: u8) -> bool {
        self.member_day
            .contains(&(user_id.to_string(), week, day_of_week))
    }

    /// 同日同部门是否已排
    pub fn department_on_day(&self, week: u32, day_of_week: u8, department_id: &str) -> bool {
        self.day_department
            .contains(&(week, day_of_week, department_id.to_string()))
    }

    /// 指定 (周, 时段) 已排部门
    pub fn department_of_slot(&self, week: u32, time_slot_id: &str) -> Option<&str> {
        self.slot_department
            .get(&(week, time_slot_id.to_string()))
            .map(String::as_str)
    }
}

// ==========================================
// RuleContext - 规则评估上下文
// ==========================================
pub struct RuleContext<'a> {
    pub week: u32,
    pub slot: &'a TimeSlot,
    /// 该候选人在该格的课程冲突 (R1 输入,由可用性解析器给出)
    pub course_conflicts: &'a [String],
    /// 该候选人在该格的自报不可用冲突 (R2 输入)
    pub unavailable_conflicts: &'a [String],
    /// 已排部分
    pub tracker: &'a AssignmentTracker,
    /// 同周期早班时段 (R5 用,按天索引的已排早班)
    pub all_slots: &'a [TimeSlot],
    /// 早班阈值 "HH:MM",开始时间不晚于该值视为早班
    pub early_slot_threshold: &'a str,
}

// ==========================================
// RuleKind - 规则目录 (封闭枚举)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// R1 课程冲突 (硬)
    CourseConflict,
    /// R2 不可用时间 (硬)
    UnavailableTime,
    /// R3 同日部门分散 (软 +50)
    DayDepartmentSpread,
    /// R4 相邻周同时段部门分散 (软 +30)
    AdjacentSlotSpread,
    /// R5 单双周早班部门分散 (软 +20)
    EarlySlotParity,
    /// R6 同人同日不重复 (硬,核心规则)
    SameDayRepeat,
    /// R7 值班量均衡 (软 ×100,核心规则)
    LoadFairness,
}

impl RuleKind {
    /// 规则编码 (与 schedule_rule.rule_code 对齐)
    pub fn code(&self) -> &'static str {
        match self {
            RuleKind::CourseConflict => "R1",
            RuleKind::UnavailableTime => "R2",
            RuleKind::DayDepartmentSpread => "R3",
            RuleKind::AdjacentSlotSpread => "R4",
            RuleKind::EarlySlotParity => "R5",
            RuleKind::SameDayRepeat => "R6",
            RuleKind::LoadFairness => "R7",
        }
    }

    /// 按编码解析规则
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "R1" => Some(RuleKind::CourseConflict),
            "R2" => Some(RuleKind::UnavailableTime),
            "R3" => Some(RuleKind::DayDepartmentSpread),
            "R4" => Some(RuleKind::AdjacentSlotSpread),
            "R5" => Some(RuleKind::EarlySlotParity),
            "R6" => Some(RuleKind::SameDayRepeat),
            "R7" => Some(RuleKind::LoadFairness),
            _ => None,
        }
    }

    /// 全部规则 (稳定顺序)
    pub fn all() -> [RuleKind; 7] {
        [
            RuleKind::CourseConflict,
            RuleKind::UnavailableTime,
            RuleKind::DayDepartmentSpread,
            RuleKind::AdjacentSlotSpread,
            RuleKind::EarlySlotParity,
            RuleKind::SameDayRepeat,
            RuleKind::LoadFairness,
        ]
    }

    /// 评估单条规则
    pub fn evaluate(&self, candidate: &Candidate, ctx: &RuleContext) -> RuleOutcome {
        match self {
            // R1: 课程冲突 (硬)
            RuleKind::CourseConflict => match ctx.course_conflicts.first() {
                Some(reason) => RuleOutcome::Veto {
                    reason: reason.clone(),
                },
                None => RuleOutcome::Score(0),
            },

            // R2: 不可用时间 (硬)
            RuleKind::UnavailableTime => match ctx.unavailable_conflicts.first() {
                Some(reason) => RuleOutcome::Veto {
                    reason: reason.clone(),
                },
                None => RuleOutcome::Score(0),
            },

            // R3: 同日同部门已排 → +50
            RuleKind::DayDepartmentSpread => {
                let hit = candidate.department_id.map_or(false, |dept| {
                    ctx.tracker
                        .department_on_day(ctx.week, ctx.slot.day_of_week, dept)
                });
                RuleOutcome::Score(if hit { 50 } else { 0 })
            }

            // R4: 相邻周 (上一周) 同时段同部门 → +30
            RuleKind::AdjacentSlotSpread => {
                let hit = match (candidate.department_id, ctx.week.checked_sub(1)) {
                    (Some(dept), Some(prev_week)) if prev_week >= 1 => ctx
                        .tracker
                        .department_of_slot(prev_week, &ctx.slot.time_slot_id)
                        .map_or(false, |d| d == dept),
                    _ => false,
                };
                RuleOutcome::Score(if hit { 30 } else { 0 })
            }

            // R5: 单双周早班,相邻周同日早班同部门 → +20
            RuleKind::EarlySlotParity => {
                if ctx.slot.start_time.as_str() > ctx.early_slot_threshold {
                    return RuleOutcome::Score(0);
                }
                let Some(dept) = candidate.department_id else {
                    return RuleOutcome::Score(0);
                };

                // 相邻周 (奇偶相反) 的同日早班
                let adjacent_weeks = [ctx.week.checked_sub(1), Some(ctx.week + 1)];
                let hit = adjacent_weeks.iter().flatten().any(|&other_week| {
                    other_week >= 1
                        && ctx
                            .all_slots
                            .iter()
                            .filter(|s| s.day_of_week == ctx.slot.day_of_week)
                            .filter(|s| s.start_time.as_str() <= ctx.early_slot_threshold)
                            .any(|s| {
                                ctx.tracker
                                    .department_of_slot(other_week, &s.time_slot_id)
                                    .map_or(false, |d| d == dept)
                            })
                });
                RuleOutcome::Score(if hit { 20 } else { 0 })
            }

            // R6: 同人同日已排 → 硬否决
            RuleKind::SameDayRepeat => {
                if ctx
                    .tracker
                    .member_on_day(candidate.user_id, ctx.week, ctx.slot.day_of_week)
                {
                    RuleOutcome::Veto {
                        reason: i18n::t("schedule.same_day_repeat"),
                    }
                } else {
                    RuleOutcome::Score(0)
                }
            }

            // R7: 值班量均衡,已排次数 ×100
            RuleKind::LoadFairness => {
                RuleOutcome::Score(ctx.tracker.assigned_count(candidate.user_id) as i32 * 100)
            }
        }
    }
}

// ==========================================
// RuleSet - 启用规则集合
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleSet {
    enabled: Vec<RuleKind>,
}

/// 候选人综合评估结果
#[derive(Debug, Clone)]
pub struct RuleDecision {
    pub vetoes: Vec<String>,
    pub score: i32,
}

impl RuleDecision {
    pub fn is_vetoed(&self) -> bool {
        !self.vetoes.is_empty()
    }
}

impl RuleSet {
    /// 由规则配置构建启用集合
    ///
    /// 不可配置规则始终启用,配置中的停用标记对其无效。
    pub fn from_rules(rules: &[ScheduleRule]) -> Self {
        let enabled_codes: HashMap<&str, bool> = rules
            .iter()
            .map(|r| (r.rule_code.as_str(), r.is_enabled || !r.is_configurable))
            .collect();

        let enabled = RuleKind::all()
            .into_iter()
            // 配置缺失的规则按启用处理 (目录固定,缺行只会发生在未播种的库)
            .filter(|kind| enabled_codes.get(kind.code()).copied().unwrap_or(true))
            .collect();

        Self { enabled }
    }

    /// 全部规则启用 (测试与默认场景)
    pub fn all_enabled() -> Self {
        Self {
            enabled: RuleKind::all().to_vec(),
        }
    }

    /// 判断规则是否启用
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// 逐条评估启用规则,汇总否决与罚分
    pub fn evaluate_all(&self, candidate: &Candidate, ctx: &RuleContext) -> RuleDecision {
        let mut vetoes = Vec::new();
        let mut score = 0;

        for kind in &self.enabled {
            match kind.evaluate(candidate, ctx) {
                RuleOutcome::Veto { reason } => vetoes.push(reason),
                RuleOutcome::Score(s) => score += s,
            }
        }

        RuleDecision { vetoes, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_slot(id: &str, day: u8, start: &str, end: &str) -> TimeSlot {
        TimeSlot {
            time_slot_id: id.to_string(),
            name: id.to_string(),
            semester_id: None,
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            is_active: true,
        }
    }

    fn base_ctx<'a>(
        slot: &'a TimeSlot,
        tracker: &'a AssignmentTracker,
        all_slots: &'a [TimeSlot],
    ) -> RuleContext<'a> {
        RuleContext {
            week: 2,
            slot,
            course_conflicts: &[],
            unavailable_conflicts: &[],
            tracker,
            all_slots,
            early_slot_threshold: "08:30",
        }
    }

    #[test]
    fn test_course_conflict_vetoes() {
        let slot = make_slot("ts1", 1, "08:00", "09:00");
        let tracker = AssignmentTracker::new();
        let conflicts = vec!["课程冲突: 高等数学".to_string()];
        let ctx = RuleContext {
            course_conflicts: &conflicts,
            ..base_ctx(&slot, &tracker, &[])
        };
        let cand = Candidate { user_id: "u1", department_id: Some("d1") };

        match RuleKind::CourseConflict.evaluate(&cand, &ctx) {
            RuleOutcome::Veto { reason } => assert!(reason.contains("高等数学")),
            _ => panic!("expected veto"),
        }
    }

    #[test]
    fn test_same_day_repeat_vetoes() {
        let slot = make_slot("ts1", 1, "08:00", "09:00");
        let mut tracker = AssignmentTracker::new();
        tracker.record("u1", Some("d1"), 2, &make_slot("ts0", 1, "12:00", "13:00"));

        let ctx = base_ctx(&slot, &tracker, &[]);
        let cand = Candidate { user_id: "u1", department_id: Some("d1") };
        assert!(matches!(
            RuleKind::SameDayRepeat.evaluate(&cand, &ctx),
            RuleOutcome::Veto { .. }
        ));

        // 其他人不受影响
        let other = Candidate { user_id: "u2", department_id: Some("d1") };
        assert_eq!(RuleKind::SameDayRepeat.evaluate(&other, &ctx), RuleOutcome::Score(0));
    }

    #[test]
    fn test_load_fairness_scales_with_count() {
        let slot = make_slot("ts1", 1, "08:00", "09:00");
        let mut tracker = AssignmentTracker::new();
        tracker.record("u1", None, 1, &make_slot("a", 2, "08:00", "09:00"));
        tracker.record("u1", None, 1, &make_slot("b", 3, "08:00", "09:00"));

        let ctx = base_ctx(&slot, &tracker, &[]);
        let cand = Candidate { user_id: "u1", department_id: None };
        assert_eq!(RuleKind::LoadFairness.evaluate(&cand, &ctx), RuleOutcome::Score(200));
    }

    #[test]
    fn test_day_department_spread_penalty() {
        let slot = make_slot("ts2", 1, "12:00", "13:00");
        let mut tracker = AssignmentTracker::new();
        tracker.record("u9", Some("d1"), 2, &make_slot("ts1", 1, "08:00", "09:00"));

        let ctx = base_ctx(&slot, &tracker, &[]);
        let same_dept = Candidate { user_id: "u1", department_id: Some("d1") };
        assert_eq!(RuleKind::DayDepartmentSpread.evaluate(&same_dept, &ctx), RuleOutcome::Score(50));

        let other_dept = Candidate { user_id: "u2", department_id: Some("d2") };
        assert_eq!(RuleKind::DayDepartmentSpread.evaluate(&other_dept, &ctx), RuleOutcome::Score(0));
    }

    #[test]
    fn test_adjacent_slot_spread_penalty() {
        let slot = make_slot("ts1", 1, "08:00", "09:00");
        let mut tracker = AssignmentTracker::new();
        // 第1周同时段已排 d1
        tracker.record("u9", Some("d1"), 1, &slot);

        let ctx = base_ctx(&slot, &tracker, &[]);
        let cand = Candidate { user_id: "u1", department_id: Some("d1") };
        assert_eq!(RuleKind::AdjacentSlotSpread.evaluate(&cand, &ctx), RuleOutcome::Score(30));
    }

    #[test]
    fn test_early_slot_parity_penalty() {
        let early = make_slot("ts-early", 1, "08:00", "09:00");
        let all_slots = vec![early.clone(), make_slot("ts-noon", 1, "12:00", "13:00")];
        let mut tracker = AssignmentTracker::new();
        // 第1周周一早班已排 d1
        tracker.record("u9", Some("d1"), 1, &early);

        let ctx = base_ctx(&early, &tracker, &all_slots);
        let cand = Candidate { user_id: "u1", department_id: Some("d1") };
        assert_eq!(RuleKind::EarlySlotParity.evaluate(&cand, &ctx), RuleOutcome::Score(20));

        // 非早班时段不触发
        let noon = &all_slots[1];
        let ctx = base_ctx(noon, &tracker, &all_slots);
        assert_eq!(RuleKind::EarlySlotParity.evaluate(&cand, &ctx), RuleOutcome::Score(0));
    }

    #[test]
    fn test_disabled_rule_skipped_entirely() {
        let rules = vec![
            ScheduleRule {
                rule_id: "rule-R3".to_string(),
                rule_code: "R3".to_string(),
                rule_name: "同日部门分散".to_string(),
                description: None,
                is_enabled: false,
                is_configurable: true,
            },
        ];
        let set = RuleSet::from_rules(&rules);
        assert!(!set.is_enabled(RuleKind::DayDepartmentSpread));
        // 目录中未出现的规则默认为启用
        assert!(set.is_enabled(RuleKind::CourseConflict));
    }

    #[test]
    fn test_non_configurable_rule_cannot_be_disabled() {
        let rules = vec![
            ScheduleRule {
                rule_id: "rule-R6".to_string(),
                rule_code: "R6".to_string(),
                rule_name: "同人同日不重复".to_string(),
                description: None,
                is_enabled: false, // 配置试图停用
                is_configurable: false,
            },
        ];
        let set = RuleSet::from_rules(&rules);
        assert!(set.is_enabled(RuleKind::SameDayRepeat));
    }
}
