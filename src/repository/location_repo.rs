// ==========================================
// 值班排班管理系统 - 值班地点仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::member::Location;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// LocationRepository - 值班地点仓储
// ==========================================
pub struct LocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LocationRepository {
    /// 创建新的LocationRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建地点
    pub fn create(&self, location: &Location) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO location (location_id, name, is_default, is_active)
               VALUES (?, ?, ?, ?)"#,
            params![
                &location.location_id,
                &location.name,
                if location.is_default { 1 } else { 0 },
                if location.is_active { 1 } else { 0 },
            ],
        )?;

        Ok(location.location_id.clone())
    }

    /// 按location_id查询地点
    pub fn find_by_id(&self, location_id: &str) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            "SELECT location_id, name, is_default, is_active FROM location WHERE location_id = ?",
            params![location_id],
            |row| Self::map_row(row),
        ) {
            Ok(location) => Ok(Some(location)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询启用地点
    pub fn list_active(&self) -> RepositoryResult<Vec<Location>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT location_id, name, is_default, is_active
               FROM location
               WHERE is_active = 1
               ORDER BY is_default DESC, name"#,
        )?;

        let locations = stmt
            .query_map([], |row| Self::map_row(row))?
            .collect::<Result<Vec<Location>, _>>()?;

        Ok(locations)
    }

    /// 查询默认地点 (无默认则返回 None)
    pub fn find_default(&self) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT location_id, name, is_default, is_active
               FROM location
               WHERE is_active = 1 AND is_default = 1
               LIMIT 1"#,
            [],
            |row| Self::map_row(row),
        ) {
            Ok(location) => Ok(Some(location)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 映射数据库行到Location对象
    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Location> {
        Ok(Location {
            location_id: row.get(0)?,
            name: row.get(1)?,
            is_default: row.get::<_, i32>(2)? == 1,
            is_active: row.get::<_, i32>(3)? == 1,
        })
    }
}
