// ==========================================
// 值班排班管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::schedule_config_trait::ScheduleConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 早班阈值默认值
pub const DEFAULT_EARLY_SLOT_THRESHOLD: &str = "08:30";

/// 发布最低填充率默认值 (0 表示不限制)
pub const DEFAULT_PUBLISH_MIN_FILL_PCT: u32 = 0;

/// 求解时间预算默认值 (毫秒)
pub const DEFAULT_SOLVER_TIMEOUT_MS: u64 = 10_000;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(
        &self,
        key: &str,
        default: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值 (UPSERT,scope_id='global')
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT OR REPLACE INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 获取所有配置的快照
    ///
    /// # 用途
    /// - 自动排班时记录配置快照,便于复盘结果口径
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// ScheduleConfigReader 实现
// ==========================================
#[async_trait]
impl ScheduleConfigReader for ConfigManager {
    async fn get_early_slot_threshold(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.get_config_or_default("early_slot_threshold", DEFAULT_EARLY_SLOT_THRESHOLD)
    }

    async fn get_publish_min_fill_pct(&self) -> Result<u32, Box<dyn Error + Send + Sync>> {
        let raw = self.get_config_or_default(
            "publish_min_fill_pct",
            &DEFAULT_PUBLISH_MIN_FILL_PCT.to_string(),
        )?;
        let pct: u32 = raw
            .parse()
            .map_err(|e| format!("publish_min_fill_pct 配置无效({}): {}", raw, e))?;
        Ok(pct.min(100))
    }

    async fn get_solver_timeout_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let raw = self.get_config_or_default(
            "solver_timeout_ms",
            &DEFAULT_SOLVER_TIMEOUT_MS.to_string(),
        )?;
        let ms: u64 = raw
            .parse()
            .map_err(|e| format!("solver_timeout_ms 配置无效({}): {}", raw, e))?;
        Ok(ms)
    }
}
