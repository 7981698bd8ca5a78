// ==========================================
// 值班排班管理系统 - 时间段仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::semester::TimeSlot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// TimeSlotRepository - 时间段仓储
// ==========================================
pub struct TimeSlotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TimeSlotRepository {
    /// 创建新的TimeSlotRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建时间段
    pub fn create(&self, slot: &TimeSlot) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO time_slot (
                time_slot_id, name, semester_id, day_of_week,
                start_time, end_time, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &slot.time_slot_id,
                &slot.name,
                &slot.semester_id,
                slot.day_of_week,
                &slot.start_time,
                &slot.end_time,
                if slot.is_active { 1 } else { 0 },
            ],
        )?;

        Ok(slot.time_slot_id.clone())
    }

    /// 按time_slot_id查询时间段
    pub fn find_by_id(&self, time_slot_id: &str) -> RepositoryResult<Option<TimeSlot>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT time_slot_id, name, semester_id, day_of_week,
                      start_time, end_time, is_active
               FROM time_slot
               WHERE time_slot_id = ?"#,
            params![time_slot_id],
            |row| Self::map_row(row),
        ) {
            Ok(slot) => Ok(Some(slot)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询学期的启用时间段 (含全局默认段)
    ///
    /// 排序: 星期 → 开始时间 → ID,与引擎的确定性遍历顺序一致
    pub fn list_active_for_semester(&self, semester_id: &str) -> RepositoryResult<Vec<TimeSlot>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT time_slot_id, name, semester_id, day_of_week,
                      start_time, end_time, is_active
               FROM time_slot
               WHERE is_active = 1
                 AND (semester_id = ? OR semester_id IS NULL)
               ORDER BY day_of_week, start_time, end_time, time_slot_id"#,
        )?;

        let slots = stmt
            .query_map(params![semester_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<TimeSlot>, _>>()?;

        Ok(slots)
    }

    /// 更新启用状态
    pub fn set_active(&self, time_slot_id: &str, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "UPDATE time_slot SET is_active = ? WHERE time_slot_id = ?",
            params![if is_active { 1 } else { 0 }, time_slot_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "TimeSlot".to_string(),
                id: time_slot_id.to_string(),
            });
        }

        Ok(())
    }

    /// 映射数据库行到TimeSlot对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<TimeSlot> {
        Ok(TimeSlot {
            time_slot_id: row.get(0)?,
            name: row.get(1)?,
            semester_id: row.get(2)?,
            day_of_week: row.get::<_, i32>(3)? as u8,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            is_active: row.get::<_, i32>(6)? == 1,
        })
    }
}
