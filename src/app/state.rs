// ==========================================
// 值班排班管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{RuleApi, ScheduleApi, SemesterApi};
use crate::config::ConfigManager;
use crate::repository::{
    DutyMemberRepository, LocationRepository, ScheduleChangeLogRepository,
    ScheduleItemRepository, ScheduleRepository, ScheduleRuleRepository, SemesterRepository,
    TimeSlotRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
/// 在Tauri应用中作为全局状态管理
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 排班API
    pub schedule_api: Arc<ScheduleApi<ConfigManager>>,

    /// 学期API
    pub semester_api: Arc<SemesterApi>,

    /// 排班规则API
    pub rule_api: Arc<RuleApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享数据库连接并应用统一 PRAGMA
    /// 2. 初始化 schema 并播种内置规则目录
    /// 3. 初始化所有Repository与API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("初始化schema失败: {}", e))?;

        // schema 版本提示 (不做自动迁移)
        match crate::db::read_schema_version(&conn) {
            Ok(Some(v)) if v != crate::db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema_version={} 与期望版本 {} 不一致",
                    v,
                    crate::db::CURRENT_SCHEMA_VERSION
                );
            }
            Err(e) => tracing::warn!("读取schema_version失败(将继续启动): {}", e),
            _ => {}
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        let semester_repo = Arc::new(SemesterRepository::new(conn.clone()));
        let time_slot_repo = Arc::new(TimeSlotRepository::new(conn.clone()));
        let member_repo = Arc::new(DutyMemberRepository::new(conn.clone()));
        let location_repo = Arc::new(LocationRepository::new(conn.clone()));
        let schedule_repo = Arc::new(ScheduleRepository::new(conn.clone()));
        let item_repo = Arc::new(ScheduleItemRepository::new(conn.clone()));
        let change_log_repo = Arc::new(ScheduleChangeLogRepository::new(conn.clone()));
        let rule_repo = Arc::new(ScheduleRuleRepository::new(conn.clone()));

        // 播种内置规则目录 (已有配置保留)
        rule_repo
            .seed_builtin_rules()
            .map_err(|e| format!("播种排班规则失败: {}", e))?;

        // 配置管理器 (共享同一连接)
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================

        let schedule_api = Arc::new(ScheduleApi::new(
            semester_repo.clone(),
            time_slot_repo.clone(),
            member_repo.clone(),
            location_repo.clone(),
            schedule_repo.clone(),
            item_repo,
            change_log_repo,
            rule_repo.clone(),
            config_manager.clone(),
        ));

        let semester_api = Arc::new(SemesterApi::new(
            semester_repo,
            time_slot_repo,
            location_repo,
            member_repo,
            schedule_repo,
        ));

        let rule_api = Arc::new(RuleApi::new(rule_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            schedule_api,
            semester_api,
            rule_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用系统数据目录,不可用时退回当前目录
pub fn get_default_db_path() -> String {
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join("duty-roster");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!("创建数据目录失败(使用当前目录): {}", e);
        return "duty_roster.db".to_string();
    }
    dir.join("duty_roster.db").to_string_lossy().to_string()
}
