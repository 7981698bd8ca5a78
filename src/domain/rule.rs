// ==========================================
// 值班排班管理系统 - 排班规则配置领域模型
// ==========================================
// 规则目录固定 (R1-R7),管理员只能切换启用状态;
// is_configurable = false 的规则不可停用,始终参与计算
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleRule - 排班规则配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub rule_id: String,         // 规则ID
    pub rule_code: String,       // 规则编码 (R1-R7)
    pub rule_name: String,       // 规则名称
    pub description: Option<String>, // 说明
    pub is_enabled: bool,        // 是否启用
    pub is_configurable: bool,   // 是否允许配置
}

impl ScheduleRule {
    /// 内置规则目录 (建库种子)
    ///
    /// R6/R7 为核心规则,不可配置。
    pub fn builtin_catalog() -> Vec<ScheduleRule> {
        let make = |code: &str, name: &str, desc: &str, configurable: bool| ScheduleRule {
            rule_id: format!("rule-{}", code),
            rule_code: code.to_string(),
            rule_name: name.to_string(),
            description: Some(desc.to_string()),
            is_enabled: true,
            is_configurable: configurable,
        };

        vec![
            make("R1", "课程冲突检测", "候选人课程与时段重叠时排除 (硬约束)", true),
            make("R2", "不可用时间检测", "候选人自报不可用时间与时段重叠时排除 (硬约束)", true),
            make("R3", "同日部门分散", "同一天同部门重复值班时加罚分 (软约束)", true),
            make("R4", "相邻班次部门分散", "同一时段与上周同部门时加罚分 (软约束)", true),
            make("R5", "单双周早班分散", "单双周同日早班同部门时加罚分 (软约束)", true),
            make("R6", "同人同日不重复", "同一人同一天不安排两个班次 (硬约束,核心规则)", false),
            make("R7", "值班量均衡", "按当前已排班次数加罚分,排班少者优先 (软约束,核心规则)", false),
        ]
    }
}
