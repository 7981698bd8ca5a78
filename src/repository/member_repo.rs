// ==========================================
// 值班排班管理系统 - 值班人员仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 值班人员圈定 / 课表 / 不可用时间数据访问
// ==========================================

use crate::domain::member::{CourseOccurrence, DutyMember, UnavailableEntry};
use crate::domain::types::{RepeatType, TimetableStatus, WeekParity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::semester_repo::parse_date;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// DutyMemberRepository - 值班人员仓储
// ==========================================
pub struct DutyMemberRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DutyMemberRepository {
    /// 创建新的DutyMemberRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 值班人员
    // ==========================================

    /// 写入/更新值班人员 (UPSERT)
    pub fn upsert_member(&self, member: &DutyMember) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT OR REPLACE INTO duty_member (
                user_id, semester_id, name, student_no,
                department_id, department_name, duty_required, timetable_status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &member.user_id,
                &member.semester_id,
                &member.name,
                &member.student_no,
                &member.department_id,
                &member.department_name,
                if member.duty_required { 1 } else { 0 },
                member.timetable_status.to_db_str(),
            ],
        )?;

        Ok(())
    }

    /// 查询学期的全部需值班人员
    pub fn list_duty_required(&self, semester_id: &str) -> RepositoryResult<Vec<DutyMember>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT user_id, semester_id, name, student_no,
                      department_id, department_name, duty_required, timetable_status
               FROM duty_member
               WHERE semester_id = ? AND duty_required = 1
               ORDER BY user_id"#,
        )?;

        let members = stmt
            .query_map(params![semester_id], |row| Self::map_member_row(row))?
            .collect::<Result<Vec<DutyMember>, _>>()?;

        Ok(members)
    }

    /// 查询学期的合格候选人 (需值班且已提交课表),按 user_id 稳定排序
    pub fn list_eligible(&self, semester_id: &str) -> RepositoryResult<Vec<DutyMember>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT user_id, semester_id, name, student_no,
                      department_id, department_name, duty_required, timetable_status
               FROM duty_member
               WHERE semester_id = ? AND duty_required = 1 AND timetable_status = 'SUBMITTED'
               ORDER BY user_id"#,
        )?;

        let members = stmt
            .query_map(params![semester_id], |row| Self::map_member_row(row))?
            .collect::<Result<Vec<DutyMember>, _>>()?;

        Ok(members)
    }

    /// 查询单个值班人员
    pub fn find_member(
        &self,
        semester_id: &str,
        user_id: &str,
    ) -> RepositoryResult<Option<DutyMember>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT user_id, semester_id, name, student_no,
                      department_id, department_name, duty_required, timetable_status
               FROM duty_member
               WHERE semester_id = ? AND user_id = ?"#,
            params![semester_id, user_id],
            |row| Self::map_member_row(row),
        ) {
            Ok(member) => Ok(Some(member)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 统计需值班人数
    pub fn count_duty_required(&self, semester_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM duty_member WHERE semester_id = ? AND duty_required = 1",
            params![semester_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// 统计需值班且已提交课表人数
    pub fn count_duty_required_submitted(&self, semester_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM duty_member
               WHERE semester_id = ? AND duty_required = 1 AND timetable_status = 'SUBMITTED'"#,
            params![semester_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    // ==========================================
    // 课表
    // ==========================================

    /// 写入课程记录
    pub fn insert_course(&self, course: &CourseOccurrence) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO course_occurrence (
                course_id, user_id, semester_id, course_name, day_of_week,
                start_time, end_time, week_type, repeat_type, specific_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &course.course_id,
                &course.user_id,
                &course.semester_id,
                &course.course_name,
                course.day_of_week,
                &course.start_time,
                &course.end_time,
                course.week_type.to_db_str(),
                course.repeat_type.to_db_str(),
                &course.specific_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;

        Ok(course.course_id.clone())
    }

    /// 查询学期全部课程记录
    pub fn list_courses_by_semester(
        &self,
        semester_id: &str,
    ) -> RepositoryResult<Vec<CourseOccurrence>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT course_id, user_id, semester_id, course_name, day_of_week,
                      start_time, end_time, week_type, repeat_type, specific_date
               FROM course_occurrence
               WHERE semester_id = ?"#,
        )?;

        let courses = stmt
            .query_map(params![semester_id], |row| Self::map_course_row(row))?
            .collect::<Result<Vec<CourseOccurrence>, _>>()?;

        Ok(courses)
    }

    /// 查询指定人员的课程记录
    pub fn list_courses_by_user(
        &self,
        semester_id: &str,
        user_id: &str,
    ) -> RepositoryResult<Vec<CourseOccurrence>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT course_id, user_id, semester_id, course_name, day_of_week,
                      start_time, end_time, week_type, repeat_type, specific_date
               FROM course_occurrence
               WHERE semester_id = ? AND user_id = ?"#,
        )?;

        let courses = stmt
            .query_map(params![semester_id, user_id], |row| Self::map_course_row(row))?
            .collect::<Result<Vec<CourseOccurrence>, _>>()?;

        Ok(courses)
    }

    // ==========================================
    // 不可用时间
    // ==========================================

    /// 写入不可用时间记录
    pub fn insert_unavailable(&self, entry: &UnavailableEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO unavailable_entry (
                entry_id, user_id, semester_id, day_of_week, start_time,
                end_time, reason, week_type, repeat_type, specific_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &entry.entry_id,
                &entry.user_id,
                &entry.semester_id,
                entry.day_of_week,
                &entry.start_time,
                &entry.end_time,
                &entry.reason,
                entry.week_type.to_db_str(),
                entry.repeat_type.to_db_str(),
                &entry.specific_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;

        Ok(entry.entry_id.clone())
    }

    /// 查询学期全部不可用时间记录
    pub fn list_unavailable_by_semester(
        &self,
        semester_id: &str,
    ) -> RepositoryResult<Vec<UnavailableEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT entry_id, user_id, semester_id, day_of_week, start_time,
                      end_time, reason, week_type, repeat_type, specific_date
               FROM unavailable_entry
               WHERE semester_id = ?"#,
        )?;

        let entries = stmt
            .query_map(params![semester_id], |row| Self::map_unavailable_row(row))?
            .collect::<Result<Vec<UnavailableEntry>, _>>()?;

        Ok(entries)
    }

    /// 查询指定人员的不可用时间记录
    pub fn list_unavailable_by_user(
        &self,
        semester_id: &str,
        user_id: &str,
    ) -> RepositoryResult<Vec<UnavailableEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT entry_id, user_id, semester_id, day_of_week, start_time,
                      end_time, reason, week_type, repeat_type, specific_date
               FROM unavailable_entry
               WHERE semester_id = ? AND user_id = ?"#,
        )?;

        let entries = stmt
            .query_map(params![semester_id, user_id], |row| Self::map_unavailable_row(row))?
            .collect::<Result<Vec<UnavailableEntry>, _>>()?;

        Ok(entries)
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_member_row(row: &rusqlite::Row) -> rusqlite::Result<DutyMember> {
        Ok(DutyMember {
            user_id: row.get(0)?,
            semester_id: row.get(1)?,
            name: row.get(2)?,
            student_no: row.get(3)?,
            department_id: row.get(4)?,
            department_name: row.get(5)?,
            duty_required: row.get::<_, i32>(6)? == 1,
            timetable_status: TimetableStatus::from_str(&row.get::<_, String>(7)?),
        })
    }

    fn map_course_row(row: &rusqlite::Row) -> rusqlite::Result<CourseOccurrence> {
        Ok(CourseOccurrence {
            course_id: row.get(0)?,
            user_id: row.get(1)?,
            semester_id: row.get(2)?,
            course_name: row.get(3)?,
            day_of_week: row.get::<_, i32>(4)? as u8,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            week_type: WeekParity::from_str(&row.get::<_, String>(7)?),
            repeat_type: RepeatType::from_str(&row.get::<_, String>(8)?),
            specific_date: match row.get::<_, Option<String>>(9)? {
                Some(_) => Some(parse_date(row, 9)?),
                None => None,
            },
        })
    }

    fn map_unavailable_row(row: &rusqlite::Row) -> rusqlite::Result<UnavailableEntry> {
        Ok(UnavailableEntry {
            entry_id: row.get(0)?,
            user_id: row.get(1)?,
            semester_id: row.get(2)?,
            day_of_week: row.get::<_, i32>(3)? as u8,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            reason: row.get(6)?,
            week_type: WeekParity::from_str(&row.get::<_, String>(7)?),
            repeat_type: RepeatType::from_str(&row.get::<_, String>(8)?),
            specific_date: match row.get::<_, Option<String>>(9)? {
                Some(_) => Some(parse_date(row, 9)?),
                None => None,
            },
        })
    }
}
