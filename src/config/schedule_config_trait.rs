// ==========================================
// 值班排班管理系统 - 排班配置读取接口
// ==========================================
// 用途: 引擎调用方通过该 trait 读取排班相关配置,
//       便于测试中用内存实现替换数据库实现
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 排班配置读取接口
#[async_trait]
pub trait ScheduleConfigReader: Send + Sync {
    /// 早班阈值 "HH:MM",开始时间不晚于该值的时段视为早班 (R5)
    async fn get_early_slot_threshold(&self) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// 发布所需的最低填充率 (0-100,0 表示不限制)
    async fn get_publish_min_fill_pct(&self) -> Result<u32, Box<dyn Error + Send + Sync>>;

    /// 求解时间预算 (毫秒)
    async fn get_solver_timeout_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;
}
