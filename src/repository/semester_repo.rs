// ==========================================
// 值班排班管理系统 - 学期仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 全局唯一激活学期由事务 + 唯一索引保证
// ==========================================

use crate::domain::semester::Semester;
use crate::domain::types::{SemesterPhase, WeekParity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SemesterRepository - 学期仓储
// ==========================================
pub struct SemesterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SemesterRepository {
    /// 创建新的SemesterRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建学期
    pub fn create(&self, semester: &Semester) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO semester (
                semester_id, name, start_date, end_date, first_week_type,
                is_active, phase, created_at, updated_at, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &semester.semester_id,
                &semester.name,
                &semester.start_date.format("%Y-%m-%d").to_string(),
                &semester.end_date.format("%Y-%m-%d").to_string(),
                semester.first_week_type.to_db_str(),
                if semester.is_active { 1 } else { 0 },
                semester.phase.to_db_str(),
                &semester.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &semester.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &semester.revision,
            ],
        )?;

        Ok(semester.semester_id.clone())
    }

    /// 按semester_id查询学期
    pub fn find_by_id(&self, semester_id: &str) -> RepositoryResult<Option<Semester>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT semester_id, name, start_date, end_date, first_week_type,
                      is_active, phase, created_at, updated_at, revision
               FROM semester
               WHERE semester_id = ?"#,
            params![semester_id],
            |row| Self::map_row(row),
        ) {
            Ok(semester) => Ok(Some(semester)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询当前激活学期
    pub fn find_active(&self) -> RepositoryResult<Option<Semester>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT semester_id, name, start_date, end_date, first_week_type,
                      is_active, phase, created_at, updated_at, revision
               FROM semester
               WHERE is_active = 1"#,
            [],
            |row| Self::map_row(row),
        ) {
            Ok(semester) => Ok(Some(semester)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询所有学期 (按起始日期降序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Semester>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT semester_id, name, start_date, end_date, first_week_type,
                      is_active, phase, created_at, updated_at, revision
               FROM semester
               ORDER BY start_date DESC"#,
        )?;

        let semesters = stmt
            .query_map([], |row| Self::map_row(row))?
            .collect::<Result<Vec<Semester>, _>>()?;

        Ok(semesters)
    }

    /// 激活学期 (同时取消其他学期的激活状态)
    ///
    /// # 红线
    /// - 必须在事务中完成,配合唯一索引保证全局单激活
    pub fn activate(&self, semester_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // 1. 确认目标学期存在
        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM semester WHERE semester_id = ?",
                params![semester_id],
                |_row| Ok(true),
            )
            .unwrap_or(false);
        if !exists {
            return Err(RepositoryError::NotFound {
                entity: "Semester".to_string(),
                id: semester_id.to_string(),
            });
        }

        // 2. 先取消所有激活,再激活指定学期
        tx.execute("UPDATE semester SET is_active = 0 WHERE is_active = 1", [])?;
        tx.execute(
            "UPDATE semester SET is_active = 1 WHERE semester_id = ?",
            params![semester_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// 更新学期 (带乐观锁检查)
    ///
    /// # 并发控制
    /// 使用乐观锁 (revision字段) 防止并发更新冲突
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision不匹配
    /// - `RepositoryError::NotFound`: semester_id不存在
    pub fn update(&self, semester: &Semester) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            r#"UPDATE semester
               SET name = ?, start_date = ?, end_date = ?, first_week_type = ?,
                   phase = ?, updated_at = ?, revision = revision + 1
               WHERE semester_id = ? AND revision = ?"#,
            params![
                &semester.name,
                &semester.start_date.format("%Y-%m-%d").to_string(),
                &semester.end_date.format("%Y-%m-%d").to_string(),
                semester.first_week_type.to_db_str(),
                semester.phase.to_db_str(),
                &chrono::Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
                &semester.semester_id,
                &semester.revision,
            ],
        )?;

        if rows_affected == 0 {
            // 判断是记录不存在还是revision冲突
            let exists: Result<i32, _> = conn.query_row(
                "SELECT revision FROM semester WHERE semester_id = ?",
                params![&semester.semester_id],
                |row| row.get(0),
            );

            match exists {
                Ok(actual_revision) => {
                    return Err(RepositoryError::OptimisticLockFailure {
                        entity: "Semester".to_string(),
                        id: semester.semester_id.clone(),
                        expected: semester.revision,
                        actual: actual_revision,
                    });
                }
                Err(_) => {
                    return Err(RepositoryError::NotFound {
                        entity: "Semester".to_string(),
                        id: semester.semester_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// 映射数据库行到Semester对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Semester> {
        Ok(Semester {
            semester_id: row.get(0)?,
            name: row.get(1)?,
            start_date: parse_date(row, 2)?,
            end_date: parse_date(row, 3)?,
            first_week_type: WeekParity::from_str(&row.get::<_, String>(4)?),
            is_active: row.get::<_, i32>(5)? == 1,
            phase: SemesterPhase::from_str(&row.get::<_, String>(6)?),
            created_at: parse_datetime(row, 7)?,
            updated_at: parse_datetime(row, 8)?,
            revision: row.get(9)?,
        })
    }
}

/// 解析 "%Y-%m-%d" 格式的日期列
pub(crate) fn parse_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&row.get::<_, String>(idx)?, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 解析 "%Y-%m-%d %H:%M:%S" 格式的时间列
pub(crate) fn parse_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&row.get::<_, String>(idx)?, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
