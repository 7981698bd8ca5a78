// ==========================================
// 值班排班管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供排班域表的建表入口（应用启动/测试共用）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：版本号用于提示/告警（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化排班域 schema（幂等）
///
/// 应用启动和集成测试共用同一份 DDL，避免两套建表语句漂移。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS semester (
            semester_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            first_week_type TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 0,
            phase TEXT NOT NULL DEFAULT 'CONFIGURING',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0
        );
        -- 全局唯一激活学期
        CREATE UNIQUE INDEX IF NOT EXISTS idx_semester_single_active
            ON semester (is_active) WHERE is_active = 1;

        CREATE TABLE IF NOT EXISTS department (
            department_id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS time_slot (
            time_slot_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            semester_id TEXT REFERENCES semester(semester_id),
            day_of_week INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS duty_member (
            user_id TEXT NOT NULL,
            semester_id TEXT NOT NULL REFERENCES semester(semester_id),
            name TEXT NOT NULL,
            student_no TEXT,
            department_id TEXT,
            department_name TEXT,
            duty_required INTEGER NOT NULL DEFAULT 0,
            timetable_status TEXT NOT NULL DEFAULT 'NOT_SUBMITTED',
            PRIMARY KEY (user_id, semester_id)
        );

        CREATE TABLE IF NOT EXISTS course_occurrence (
            course_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            semester_id TEXT NOT NULL REFERENCES semester(semester_id),
            course_name TEXT NOT NULL,
            day_of_week INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            week_type TEXT NOT NULL DEFAULT 'ALL',
            repeat_type TEXT NOT NULL DEFAULT 'WEEKLY',
            specific_date TEXT
        );

        CREATE TABLE IF NOT EXISTS unavailable_entry (
            entry_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            semester_id TEXT NOT NULL REFERENCES semester(semester_id),
            day_of_week INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            reason TEXT,
            week_type TEXT NOT NULL DEFAULT 'ALL',
            repeat_type TEXT NOT NULL DEFAULT 'WEEKLY',
            specific_date TEXT
        );

        CREATE TABLE IF NOT EXISTS location (
            location_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            is_default INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS schedule (
            schedule_id TEXT PRIMARY KEY,
            semester_id TEXT NOT NULL REFERENCES semester(semester_id),
            status TEXT NOT NULL DEFAULT 'DRAFT',
            published_at TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0,
            UNIQUE (semester_id)
        );

        CREATE TABLE IF NOT EXISTS schedule_item (
            schedule_item_id TEXT PRIMARY KEY,
            schedule_id TEXT NOT NULL REFERENCES schedule(schedule_id) ON DELETE CASCADE,
            week_number INTEGER NOT NULL,
            time_slot_id TEXT NOT NULL REFERENCES time_slot(time_slot_id),
            member_id TEXT,
            location_id TEXT REFERENCES location(location_id),
            UNIQUE (schedule_id, week_number, time_slot_id)
        );

        CREATE TABLE IF NOT EXISTS schedule_change_log (
            change_log_id TEXT PRIMARY KEY,
            schedule_id TEXT NOT NULL,
            schedule_item_id TEXT NOT NULL,
            original_member_id TEXT,
            new_member_id TEXT NOT NULL,
            change_type TEXT NOT NULL,
            reason TEXT NOT NULL,
            operator TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_change_log_schedule
            ON schedule_change_log (schedule_id, created_at DESC);

        CREATE TABLE IF NOT EXISTS schedule_rule (
            rule_id TEXT PRIMARY KEY,
            rule_code TEXT NOT NULL UNIQUE,
            rule_name TEXT NOT NULL,
            description TEXT,
            is_enabled INTEGER NOT NULL DEFAULT 1,
            is_configurable INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
