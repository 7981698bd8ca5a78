// ==========================================
// 值班排班管理系统 - 排班表仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 每学期一份排班表 (UNIQUE(semester_id));
//       草稿整体替换必须在事务中完成
// ==========================================

use crate::domain::schedule::{Schedule, ScheduleItem};
use crate::domain::types::ScheduleStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::semester_repo::parse_datetime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduleRepository - 排班表仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的ScheduleRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按schedule_id查询排班表
    pub fn find_by_id(&self, schedule_id: &str) -> RepositoryResult<Option<Schedule>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT schedule_id, semester_id, status, published_at,
                      created_by, created_at, updated_at, revision
               FROM schedule
               WHERE schedule_id = ?"#,
            params![schedule_id],
            |row| Self::map_row(row),
        ) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按semester_id查询排班表
    pub fn find_by_semester(&self, semester_id: &str) -> RepositoryResult<Option<Schedule>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT schedule_id, semester_id, status, published_at,
                      created_by, created_at, updated_at, revision
               FROM schedule
               WHERE semester_id = ?"#,
            params![semester_id],
            |row| Self::map_row(row),
        ) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 整体替换学期的草稿排班表 (删除旧表与明细后写入新表与明细)
    ///
    /// # 红线
    /// - 必须在同一事务中完成,并发重跑不得出现半新半旧的明细
    /// - 调用方负责保证已发布排班表不会走到这里
    pub fn replace_for_semester(
        &self,
        schedule: &Schedule,
        items: &[ScheduleItem],
    ) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 1. 删除旧排班表 (schedule_item 随 ON DELETE CASCADE 级联)
        tx.execute(
            "DELETE FROM schedule WHERE semester_id = ?",
            params![&schedule.semester_id],
        )?;

        // 2. 写入新排班表
        tx.execute(
            r#"INSERT INTO schedule (
                schedule_id, semester_id, status, published_at,
                created_by, created_at, updated_at, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &schedule.schedule_id,
                &schedule.semester_id,
                schedule.status.to_db_str(),
                &schedule
                    .published_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                &schedule.created_by,
                &schedule.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &schedule.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &schedule.revision,
            ],
        )?;

        // 3. 批量写入明细 (空缺格也落库)
        for item in items {
            tx.execute(
                r#"INSERT INTO schedule_item (
                    schedule_item_id, schedule_id, week_number,
                    time_slot_id, member_id, location_id
                ) VALUES (?, ?, ?, ?, ?, ?)"#,
                params![
                    &item.schedule_item_id,
                    &item.schedule_id,
                    item.week_number,
                    &item.time_slot_id,
                    &item.member_id,
                    &item.location_id,
                ],
            )?;
        }

        tx.commit()?;
        Ok(schedule.schedule_id.clone())
    }

    /// 更新排班表 (带乐观锁检查)
    ///
    /// # 并发控制
    /// 使用乐观锁 (revision字段) 防止并发发布/更新冲突
    pub fn update(&self, schedule: &Schedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            r#"UPDATE schedule
               SET status = ?, published_at = ?, updated_at = ?, revision = revision + 1
               WHERE schedule_id = ? AND revision = ?"#,
            params![
                schedule.status.to_db_str(),
                &schedule
                    .published_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                &chrono::Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
                &schedule.schedule_id,
                &schedule.revision,
            ],
        )?;

        if rows_affected == 0 {
            let exists: Result<i32, _> = conn.query_row(
                "SELECT revision FROM schedule WHERE schedule_id = ?",
                params![&schedule.schedule_id],
                |row| row.get(0),
            );

            match exists {
                Ok(actual_revision) => {
                    return Err(RepositoryError::OptimisticLockFailure {
                        entity: "Schedule".to_string(),
                        id: schedule.schedule_id.clone(),
                        expected: schedule.revision,
                        actual: actual_revision,
                    });
                }
                Err(_) => {
                    return Err(RepositoryError::NotFound {
                        entity: "Schedule".to_string(),
                        id: schedule.schedule_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// 映射数据库行到Schedule对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Schedule> {
        Ok(Schedule {
            schedule_id: row.get(0)?,
            semester_id: row.get(1)?,
            status: ScheduleStatus::from_str(&row.get::<_, String>(2)?),
            published_at: match row.get::<_, Option<String>>(3)? {
                Some(_) => Some(parse_datetime(row, 3)?),
                None => None,
            },
            created_by: row.get(4)?,
            created_at: parse_datetime(row, 5)?,
            updated_at: parse_datetime(row, 6)?,
            revision: row.get(7)?,
        })
    }
}

// ==========================================
// ScheduleItemRepository - 排班项仓储
// ==========================================
pub struct ScheduleItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleItemRepository {
    /// 创建新的ScheduleItemRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按schedule_item_id查询排班项
    pub fn find_by_id(&self, schedule_item_id: &str) -> RepositoryResult<Option<ScheduleItem>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT schedule_item_id, schedule_id, week_number,
                      time_slot_id, member_id, location_id
               FROM schedule_item
               WHERE schedule_item_id = ?"#,
            params![schedule_item_id],
            |row| Self::map_row(row),
        ) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询排班表的全部排班项 (周次 → 时间段稳定排序)
    pub fn find_by_schedule(&self, schedule_id: &str) -> RepositoryResult<Vec<ScheduleItem>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT schedule_item_id, schedule_id, week_number,
                      time_slot_id, member_id, location_id
               FROM schedule_item
               WHERE schedule_id = ?
               ORDER BY week_number, time_slot_id"#,
        )?;

        let items = stmt
            .query_map(params![schedule_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<ScheduleItem>, _>>()?;

        Ok(items)
    }

    /// 查询指定人员在排班表中的排班项
    pub fn find_by_schedule_and_member(
        &self,
        schedule_id: &str,
        member_id: &str,
    ) -> RepositoryResult<Vec<ScheduleItem>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT schedule_item_id, schedule_id, week_number,
                      time_slot_id, member_id, location_id
               FROM schedule_item
               WHERE schedule_id = ? AND member_id = ?
               ORDER BY week_number, time_slot_id"#,
        )?;

        let items = stmt
            .query_map(params![schedule_id, member_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<ScheduleItem>, _>>()?;

        Ok(items)
    }

    /// 查询排班表引用到的人员ID去重集合 (范围检测基线)
    pub fn list_distinct_member_ids(&self, schedule_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT DISTINCT member_id
               FROM schedule_item
               WHERE schedule_id = ? AND member_id IS NOT NULL
               ORDER BY member_id"#,
        )?;

        let ids = stmt
            .query_map(params![schedule_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    /// 更新排班项的指派 (人员/地点)
    pub fn update_assignment(
        &self,
        schedule_item_id: &str,
        member_id: Option<&str>,
        location_id: Option<&str>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"UPDATE schedule_item
               SET member_id = ?, location_id = ?
               WHERE schedule_item_id = ?"#,
            params![member_id, location_id, schedule_item_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ScheduleItem".to_string(),
                id: schedule_item_id.to_string(),
            });
        }

        Ok(())
    }

    /// 统计排班表的总格数与已填充格数
    pub fn count_fill(&self, schedule_id: &str) -> RepositoryResult<(i64, i64)> {
        let conn = self.get_conn()?;

        let (total, filled): (i64, i64) = conn.query_row(
            r#"SELECT COUNT(*), COUNT(member_id)
               FROM schedule_item
               WHERE schedule_id = ?"#,
            params![schedule_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok((total, filled))
    }

    /// 映射数据库行到ScheduleItem对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ScheduleItem> {
        Ok(ScheduleItem {
            schedule_item_id: row.get(0)?,
            schedule_id: row.get(1)?,
            week_number: row.get::<_, i64>(2)? as u32,
            time_slot_id: row.get(3)?,
            member_id: row.get(4)?,
            location_id: row.get(5)?,
        })
    }
}
