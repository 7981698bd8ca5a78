// ==========================================
// 值班排班管理系统 - 排班变更日志仓储
// ==========================================
// 红线: 仅追加。本仓储不提供 update/delete 方法,
//       审计日志一经写入不可变更
// ==========================================

use crate::domain::change_log::ScheduleChangeLog;
use crate::domain::types::ChangeType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::semester_repo::parse_datetime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduleChangeLogRepository - 变更日志仓储
// ==========================================
pub struct ScheduleChangeLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleChangeLogRepository {
    /// 创建新的变更日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入变更日志
    ///
    /// # 返回
    /// - `Ok(change_log_id)`: 成功插入
    pub fn insert(&self, log: &ScheduleChangeLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO schedule_change_log (
                change_log_id, schedule_id, schedule_item_id,
                original_member_id, new_member_id, change_type,
                reason, operator, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &log.change_log_id,
                &log.schedule_id,
                &log.schedule_item_id,
                &log.original_member_id,
                &log.new_member_id,
                log.change_type.to_db_str(),
                &log.reason,
                &log.operator,
                &log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(log.change_log_id.clone())
    }

    /// 分页查询排班表的变更日志 (最新在前)
    ///
    /// # 参数
    /// - `page`: 页码 (1-based)
    /// - `page_size`: 每页条数
    ///
    /// # 返回
    /// - `Ok((logs, total))`: 当前页日志与总条数
    pub fn list_by_schedule(
        &self,
        schedule_id: &str,
        page: u32,
        page_size: u32,
    ) -> RepositoryResult<(Vec<ScheduleChangeLog>, i64)> {
        let conn = self.get_conn()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schedule_change_log WHERE schedule_id = ?",
            params![schedule_id],
            |row| row.get(0),
        )?;

        let page = page.max(1);
        let offset = (page - 1) as i64 * page_size as i64;

        let mut stmt = conn.prepare(
            r#"SELECT change_log_id, schedule_id, schedule_item_id,
                      original_member_id, new_member_id, change_type,
                      reason, operator, created_at
               FROM schedule_change_log
               WHERE schedule_id = ?
               ORDER BY created_at DESC, change_log_id DESC
               LIMIT ? OFFSET ?"#,
        )?;

        let logs = stmt
            .query_map(params![schedule_id, page_size as i64, offset], |row| {
                Self::map_row(row)
            })?
            .collect::<Result<Vec<ScheduleChangeLog>, _>>()?;

        Ok((logs, total))
    }

    /// 查询指定排班项的全部变更历史 (最新在前)
    pub fn list_by_item(&self, schedule_item_id: &str) -> RepositoryResult<Vec<ScheduleChangeLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT change_log_id, schedule_id, schedule_item_id,
                      original_member_id, new_member_id, change_type,
                      reason, operator, created_at
               FROM schedule_change_log
               WHERE schedule_item_id = ?
               ORDER BY created_at DESC, change_log_id DESC"#,
        )?;

        let logs = stmt
            .query_map(params![schedule_item_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<ScheduleChangeLog>, _>>()?;

        Ok(logs)
    }

    /// 映射数据库行到ScheduleChangeLog对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ScheduleChangeLog> {
        Ok(ScheduleChangeLog {
            change_log_id: row.get(0)?,
            schedule_id: row.get(1)?,
            schedule_item_id: row.get(2)?,
            original_member_id: row.get(3)?,
            new_member_id: row.get(4)?,
            change_type: ChangeType::from_str(&row.get::<_, String>(5)?),
            reason: row.get(6)?,
            operator: row.get(7)?,
            created_at: parse_datetime(row, 8)?,
        })
    }
}
