// ==========================================
// 值班排班管理系统 - 可用性解析器
// ==========================================
// 职责: 把课表与不可用时间展开为 (人员, 周, 时段) 维度的可用性判定
// 红线: 纯计算,无副作用;任何时间重叠都视为完全冲突 (无"部分可用")
// ==========================================
// 周期展开语义:
// - repeat_type=WEEKLY   → 每个适用周
// - repeat_type=BIWEEKLY → 按首个适用周的奇偶隔周出现
// - repeat_type=ONCE     → 仅 specific_date 所在周
// - week_type=ALL/ODD/EVEN 按学期 first_week_type 解析物理周标签后过滤
// ==========================================

use crate::domain::member::{CourseOccurrence, UnavailableEntry};
use crate::domain::semester::{Semester, TimeSlot};
use crate::domain::types::{RepeatType, WeekParity};
use crate::i18n;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ==========================================
// AvailabilityVerdict - 可用性判定
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityVerdict {
    /// 可用
    Available,
    /// 不可用,携带全部冲突原因 (课程名或自述原因)
    Unavailable { reasons: Vec<String> },
}

impl AvailabilityVerdict {
    /// 判断是否可用
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityVerdict::Available)
    }

    /// 取冲突原因 (可用时为空)
    pub fn reasons(&self) -> &[String] {
        match self {
            AvailabilityVerdict::Available => &[],
            AvailabilityVerdict::Unavailable { reasons } => reasons,
        }
    }
}

// ==========================================
// 周期展开 (纯日期运算)
// ==========================================

/// 周期描述符 (课程与不可用时间共用)
#[derive(Debug, Clone, Copy)]
pub struct Recurrence {
    pub week_type: WeekParity,
    pub repeat_type: RepeatType,
    pub specific_date: Option<chrono::NaiveDate>,
}

/// 将周期描述符展开为学期内的适用周集合 (1-based)
///
/// 与求解器无关的无状态函数,便于单独测试。
pub fn expand_weeks(recurrence: &Recurrence, semester: &Semester) -> BTreeSet<u32> {
    let total = semester.total_weeks();

    match recurrence.repeat_type {
        RepeatType::Once => {
            // 仅 specific_date 所在周;日期缺失或越界则不产生任何周
            match recurrence.specific_date.and_then(|d| semester.week_number_of(d)) {
                Some(week) => BTreeSet::from([week]),
                None => BTreeSet::new(),
            }
        }
        RepeatType::Weekly => (1..=total)
            .filter(|w| recurrence.week_type.matches(semester.week_parity_of(*w)))
            .collect(),
        RepeatType::Biweekly => {
            // 按首个适用周的奇偶锚定,之后隔周出现
            let applicable: Vec<u32> = (1..=total)
                .filter(|w| recurrence.week_type.matches(semester.week_parity_of(*w)))
                .collect();
            let anchor = match applicable.first().copied() {
                Some(a) => a,
                None => return BTreeSet::new(),
            };
            applicable
                .into_iter()
                .filter(|w| (w - anchor) % 2 == 0)
                .collect()
        }
    }
}

// ==========================================
// AvailabilityResolver - 可用性解析器
// ==========================================
// 构造时一次性展开全部记录,查询时仅做区间比对
pub struct AvailabilityResolver {
    /// user_id → 已展开的占用区间
    intervals: HashMap<String, Vec<ExpandedInterval>>,
}

/// 已展开的占用区间
#[derive(Debug, Clone)]
struct ExpandedInterval {
    day_of_week: u8,
    start_time: String,
    end_time: String,
    weeks: BTreeSet<u32>,
    reason: String,
    kind: IntervalKind,
}

/// 区间来源 (课程 / 自报不可用)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    Course,
    Declared,
}

impl AvailabilityResolver {
    /// 由学期的课程与不可用时间记录构建解析器
    pub fn new(
        semester: &Semester,
        courses: &[CourseOccurrence],
        unavailables: &[UnavailableEntry],
    ) -> Self {
        let mut intervals: HashMap<String, Vec<ExpandedInterval>> = HashMap::new();

        for course in courses {
            let weeks = expand_weeks(
                &Recurrence {
                    week_type: course.week_type,
                    repeat_type: course.repeat_type,
                    specific_date: course.specific_date,
                },
                semester,
            );
            if weeks.is_empty() {
                continue;
            }
            intervals.entry(course.user_id.clone()).or_default().push(ExpandedInterval {
                day_of_week: course.day_of_week,
                start_time: course.start_time.clone(),
                end_time: course.end_time.clone(),
                weeks,
                reason: i18n::t_with_args(
                    "schedule.course_conflict",
                    &[("course", &course.course_name)],
                ),
                kind: IntervalKind::Course,
            });
        }

        for entry in unavailables {
            let weeks = expand_weeks(
                &Recurrence {
                    week_type: entry.week_type,
                    repeat_type: entry.repeat_type,
                    specific_date: entry.specific_date,
                },
                semester,
            );
            if weeks.is_empty() {
                continue;
            }
            let reason = match entry.reason.as_deref() {
                Some(r) if !r.is_empty() => {
                    i18n::t_with_args("schedule.unavailable_conflict", &[("reason", r)])
                }
                _ => i18n::t("schedule.unavailable_conflict_default"),
            };
            intervals.entry(entry.user_id.clone()).or_default().push(ExpandedInterval {
                day_of_week: entry.day_of_week,
                start_time: entry.start_time.clone(),
                end_time: entry.end_time.clone(),
                weeks,
                reason,
                kind: IntervalKind::Declared,
            });
        }

        Self { intervals }
    }

    /// 判定人员在 (周, 时段) 的可用性
    ///
    /// 任何区间与时段在同星期同周重叠即不可用,判定携带全部重叠原因。
    pub fn resolve(&self, user_id: &str, week_number: u32, slot: &TimeSlot) -> AvailabilityVerdict {
        let reasons = self.collect_conflicts(user_id, week_number, slot, None);
        if reasons.is_empty() {
            AvailabilityVerdict::Available
        } else {
            AvailabilityVerdict::Unavailable { reasons }
        }
    }

    /// 仅收集指定来源的冲突原因 (None 表示全部来源)
    pub fn collect_conflicts(
        &self,
        user_id: &str,
        week_number: u32,
        slot: &TimeSlot,
        kind: Option<IntervalKind>,
    ) -> Vec<String> {
        let Some(user_intervals) = self.intervals.get(user_id) else {
            return Vec::new();
        };

        user_intervals
            .iter()
            .filter(|iv| kind.map_or(true, |k| iv.kind == k))
            .filter(|iv| iv.day_of_week == slot.day_of_week)
            .filter(|iv| iv.weeks.contains(&week_number))
            .filter(|iv| slot.overlaps(&iv.start_time, &iv.end_time))
            .map(|iv| iv.reason.clone())
            .collect()
    }
}
