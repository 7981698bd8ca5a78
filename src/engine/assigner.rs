// ==========================================
// 值班排班管理系统 - 自动排班引擎
// ==========================================
// 职责: 对每个 (周, 时段) 格选出最优候选人,产出草稿排班
// 红线: 不直接写库,只计算并返回结果
// ==========================================
// 确定性保证:
// - 格遍历顺序固定: 周 1..N 外层,时段按 (星期, 开始时间, 结束时间, ID) 内层
// - 候选人取最小 (罚分, 已排次数, user_id),同输入必同输出
// 超时保证: 超出时间预算立即报错,不返回半成品
// ==========================================

use crate::domain::member::DutyMember;
use crate::domain::semester::{Semester, TimeSlot};
use crate::engine::availability::{AvailabilityResolver, IntervalKind};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rules::{AssignmentTracker, Candidate, RuleContext, RuleSet};
use crate::i18n;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

// ==========================================
// AssignmentCell - 单格指派结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AssignmentCell {
    pub week_number: u32,
    pub time_slot_id: String,
    /// None 表示该格无可用候选人,保持空缺
    pub member_id: Option<String>,
}

// ==========================================
// AssignmentOutcome - 排班结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// 每个 (周, 时段) 格一条,空缺格也在内
    pub cells: Vec<AssignmentCell>,
    pub total_slots: u32,
    pub filled_slots: u32,
    /// 空缺格与降级指派说明
    pub warnings: Vec<String>,
}

// ==========================================
// AssignmentInputs - 求解输入
// ==========================================
pub struct AssignmentInputs<'a> {
    pub semester: &'a Semester,
    pub slots: &'a [TimeSlot],
    pub candidates: &'a [DutyMember],
    pub resolver: &'a AvailabilityResolver,
    pub rule_set: &'a RuleSet,
    /// 早班阈值 "HH:MM" (R5)
    pub early_slot_threshold: &'a str,
    /// 求解时间预算
    pub budget: Duration,
}

// ==========================================
// AssignmentEngine - 自动排班引擎
// ==========================================
// 单次调用为同步有界计算;同学期并发调用由 API 层串行化
pub struct AssignmentEngine;

impl AssignmentEngine {
    pub fn new() -> Self {
        Self
    }

    /// 执行自动排班
    ///
    /// # 返回
    /// - `Ok(AssignmentOutcome)`: 求解结果 (可能含空缺格,见 warnings)
    /// - `Err(EngineError::NoCandidates)`: 无任何合格候选人
    /// - `Err(EngineError::Timeout)`: 超出时间预算
    #[instrument(skip_all, fields(semester_id = %inputs.semester.semester_id))]
    pub fn run(&self, inputs: &AssignmentInputs) -> EngineResult<AssignmentOutcome> {
        if inputs.candidates.is_empty() {
            return Err(EngineError::NoCandidates {
                semester_id: inputs.semester.semester_id.clone(),
            });
        }
        if inputs.slots.is_empty() {
            return Err(EngineError::InvalidInput("无启用时间段".to_string()));
        }

        let started = Instant::now();
        let total_weeks = inputs.semester.total_weeks();

        // 固定时段顺序 (入参已按仓储排序,这里再保证一次)
        let mut slots: Vec<&TimeSlot> = inputs.slots.iter().collect();
        slots.sort_by(|a, b| {
            (a.day_of_week, &a.start_time, &a.end_time, &a.time_slot_id)
                .cmp(&(b.day_of_week, &b.start_time, &b.end_time, &b.time_slot_id))
        });

        let total_cells = total_weeks as usize * slots.len();
        let mut cells = Vec::with_capacity(total_cells);
        let mut warnings = Vec::new();
        let mut tracker = AssignmentTracker::new();
        let mut filled = 0u32;

        for week in 1..=total_weeks {
            for &slot in &slots {
                // 有界计算: 每格检查一次时间预算
                if started.elapsed() > inputs.budget {
                    return Err(EngineError::Timeout {
                        completed_cells: cells.len(),
                        total_cells,
                        budget_ms: inputs.budget.as_millis() as u64,
                    });
                }

                match self.pick_candidate(inputs, &tracker, week, slot) {
                    Some(member) => {
                        tracker.record(
                            &member.user_id,
                            member.department_id.as_deref(),
                            week,
                            slot,
                        );
                        filled += 1;
                        cells.push(AssignmentCell {
                            week_number: week,
                            time_slot_id: slot.time_slot_id.clone(),
                            member_id: Some(member.user_id.clone()),
                        });
                    }
                    None => {
                        // 无人可排: 保留空缺格并告警
                        warnings.push(i18n::t_with_args(
                            "schedule.slot_unfilled",
                            &[("slot", &slot.name), ("week", &week.to_string())],
                        ));
                        cells.push(AssignmentCell {
                            week_number: week,
                            time_slot_id: slot.time_slot_id.clone(),
                            member_id: None,
                        });
                    }
                }
            }
        }

        info!(
            total = total_cells,
            filled,
            warnings = warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "自动排班完成"
        );

        Ok(AssignmentOutcome {
            cells,
            total_slots: total_cells as u32,
            filled_slots: filled,
            warnings,
        })
    }

    /// 选出该格的最优候选人 (无幸存者时返回 None)
    fn pick_candidate<'a>(
        &self,
        inputs: &'a AssignmentInputs,
        tracker: &AssignmentTracker,
        week: u32,
        slot: &TimeSlot,
    ) -> Option<&'a DutyMember> {
        let mut best: Option<(i32, u32, &DutyMember)> = None;

        for member in inputs.candidates {
            let course_conflicts = inputs.resolver.collect_conflicts(
                &member.user_id,
                week,
                slot,
                Some(IntervalKind::Course),
            );
            let unavailable_conflicts = inputs.resolver.collect_conflicts(
                &member.user_id,
                week,
                slot,
                Some(IntervalKind::Declared),
            );

            let candidate = Candidate {
                user_id: &member.user_id,
                department_id: member.department_id.as_deref(),
            };
            let ctx = RuleContext {
                week,
                slot,
                course_conflicts: &course_conflicts,
                unavailable_conflicts: &unavailable_conflicts,
                tracker,
                all_slots: inputs.slots,
                early_slot_threshold: inputs.early_slot_threshold,
            };

            let decision = inputs.rule_set.evaluate_all(&candidate, &ctx);
            if decision.is_vetoed() {
                debug!(
                    user_id = %member.user_id,
                    week,
                    slot = %slot.time_slot_id,
                    vetoes = ?decision.vetoes,
                    "候选人被硬规则排除"
                );
                continue;
            }

            let count = tracker.assigned_count(&member.user_id);
            // 确定性决胜: 罚分 → 已排次数 → user_id
            let better = match &best {
                None => true,
                Some((best_score, best_count, best_member)) => {
                    (decision.score, count, member.user_id.as_str())
                        < (*best_score, *best_count, best_member.user_id.as_str())
                }
            };
            if better {
                best = Some((decision.score, count, member));
            }
        }

        best.map(|(_, _, member)| member)
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}
