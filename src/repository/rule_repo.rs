// ==========================================
// 值班排班管理系统 - 排班规则仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 规则目录固定,仅启用状态可写
// ==========================================

use crate::domain::rule::ScheduleRule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduleRuleRepository - 排班规则仓储
// ==========================================
pub struct ScheduleRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRuleRepository {
    /// 创建新的ScheduleRuleRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入内置规则目录 (已存在的规则保留其启用状态)
    pub fn seed_builtin_rules(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let mut count = 0;
        for rule in ScheduleRule::builtin_catalog() {
            count += conn.execute(
                r#"INSERT OR IGNORE INTO schedule_rule (
                    rule_id, rule_code, rule_name, description,
                    is_enabled, is_configurable
                ) VALUES (?, ?, ?, ?, ?, ?)"#,
                params![
                    &rule.rule_id,
                    &rule.rule_code,
                    &rule.rule_name,
                    &rule.description,
                    if rule.is_enabled { 1 } else { 0 },
                    if rule.is_configurable { 1 } else { 0 },
                ],
            )?;
        }

        Ok(count)
    }

    /// 按rule_id查询规则
    pub fn find_by_id(&self, rule_id: &str) -> RepositoryResult<Option<ScheduleRule>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT rule_id, rule_code, rule_name, description, is_enabled, is_configurable
               FROM schedule_rule
               WHERE rule_id = ?"#,
            params![rule_id],
            |row| Self::map_row(row),
        ) {
            Ok(rule) => Ok(Some(rule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部规则 (按编码排序)
    pub fn list_all(&self) -> RepositoryResult<Vec<ScheduleRule>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT rule_id, rule_code, rule_name, description, is_enabled, is_configurable
               FROM schedule_rule
               ORDER BY rule_code"#,
        )?;

        let rules = stmt
            .query_map([], |row| Self::map_row(row))?
            .collect::<Result<Vec<ScheduleRule>, _>>()?;

        Ok(rules)
    }

    /// 更新规则启用状态
    pub fn set_enabled(&self, rule_id: &str, is_enabled: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE schedule_rule SET is_enabled = ? WHERE rule_id = ?",
            params![if is_enabled { 1 } else { 0 }, rule_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ScheduleRule".to_string(),
                id: rule_id.to_string(),
            });
        }

        Ok(())
    }

    /// 映射数据库行到ScheduleRule对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ScheduleRule> {
        Ok(ScheduleRule {
            rule_id: row.get(0)?,
            rule_code: row.get(1)?,
            rule_name: row.get(2)?,
            description: row.get(3)?,
            is_enabled: row.get::<_, i32>(4)? == 1,
            is_configurable: row.get::<_, i32>(5)? == 1,
        })
    }
}
