use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{
    AssessmentResult, AssessmentType, DailyLog, FocusSession, ScoredAssessment, StatusSummary,
    Task, TaskStatus,
};
use crate::utils;

/// Allowed range for a focus session duration, in minutes.
pub const MIN_SESSION_MINUTES: i64 = 1;
pub const MAX_SESSION_MINUTES: i64 = 120;

const MAX_TITLE_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Invalid input: {0}")]
    ValidationError(String),
    #[error("Failed to encode domain scores: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        // Open or create the database
        let conn = Connection::open(&db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        // Create tasks table (sub-tasks reference their parent; deleting a
        // parent removes its sub-tasks)
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                parent_id       INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
                status          TEXT NOT NULL DEFAULT 'pending',
                created_at      TEXT NOT NULL,
                completed_at    TEXT
            )",
            [],
        )?;

        // Create focus_sessions table (sessions outlive their task)
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS focus_sessions (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id          INTEGER REFERENCES tasks(id) ON DELETE SET NULL,
                duration_minutes INTEGER NOT NULL,
                completed_at     TEXT NOT NULL
            )",
            [],
        )?;

        // Create daily_log table (one row per calendar day, upserted)
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS daily_log (
                date             TEXT PRIMARY KEY,
                tasks_completed  INTEGER NOT NULL DEFAULT 0,
                focus_minutes    INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // Create assessments table (append-only)
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS assessments (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                type            TEXT NOT NULL,
                score           INTEGER NOT NULL,
                max_score       INTEGER NOT NULL,
                domain_scores   TEXT NOT NULL DEFAULT '{}',
                taken_at        TEXT NOT NULL
            )",
            [],
        )?;

        // Create indexes
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_parent_id ON tasks(parent_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assessments_taken_at ON assessments(taken_at)",
            [],
        )?;

        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let status_raw: String = row.get(3)?;
        let status = TaskStatus::parse(&status_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown task status: {status_raw}").into(),
            )
        })?;
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            parent_id: row.get(2)?,
            status,
            created_at: row.get(4)?,
            completed_at: row.get(5)?,
        })
    }

    /// Insert a new task with pending status and return it
    pub fn add_task(&self, title: &str, parent_id: Option<i64>) -> Result<Task, DatabaseError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DatabaseError::ValidationError(
                "task title must not be empty".to_string(),
            ));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DatabaseError::ValidationError(format!(
                "task title must be at most {MAX_TITLE_LEN} characters"
            )));
        }

        self.conn.execute(
            "INSERT INTO tasks (title, parent_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                title,
                parent_id,
                TaskStatus::Pending.as_str(),
                utils::now_string()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_task(id)?.ok_or_else(|| {
            DatabaseError::SqliteError(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a single task by ID, or None if it doesn't exist
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, parent_id, status, created_at, completed_at
             FROM tasks WHERE id = ?1",
        )?;

        match stmt.query_row(rusqlite::params![id], Self::row_to_task) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// List tasks ordered by creation time, optionally filtered by status
    /// and/or parent task
    pub fn list_tasks(
        &self,
        status: Option<TaskStatus>,
        parent_id: Option<i64>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let mut query = String::from(
            "SELECT id, title, parent_id, status, created_at, completed_at
             FROM tasks WHERE 1=1",
        );
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        if let Some(status) = status {
            query.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }
        if let Some(parent_id) = parent_id {
            query.push_str(" AND parent_id = ?");
            params.push(Box::new(parent_id));
        }
        query.push_str(" ORDER BY created_at ASC, id ASC");

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(AsRef::as_ref).collect();
        let mut stmt = self.conn.prepare(&query)?;
        let tasks = stmt
            .query_map(params_refs.as_slice(), Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Get all sub-tasks of a parent task
    pub fn get_subtasks(&self, parent_id: i64) -> Result<Vec<Task>, DatabaseError> {
        self.list_tasks(None, Some(parent_id))
    }

    /// Mark a task as done and bump today's completion counter. Both writes
    /// happen in one transaction; an unknown ID leaves the daily log alone.
    pub fn complete_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3",
            rusqlite::params![TaskStatus::Done.as_str(), utils::now_string(), id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        tx.execute(
            "INSERT INTO daily_log (date, tasks_completed, focus_minutes)
             VALUES (?1, 1, 0)
             ON CONFLICT(date) DO UPDATE SET tasks_completed = tasks_completed + 1",
            rusqlite::params![utils::today_string()],
        )?;
        tx.commit()?;
        self.get_task(id)
    }

    /// Set a task to active status (a focus timer was started on it)
    pub fn set_task_active(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            rusqlite::params![TaskStatus::Active.as_str(), id],
        )?;
        self.get_task(id)
    }

    /// Revert a completed task back to pending, clearing its completion time
    pub fn uncomplete_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        self.conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = NULL WHERE id = ?2",
            rusqlite::params![TaskStatus::Pending.as_str(), id],
        )?;
        self.get_task(id)
    }

    /// Delete a task by ID. Sub-tasks are removed with it; focus sessions
    /// keep their row with task_id set to NULL.
    pub fn delete_task(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(())
    }

    /// Helper function to map a row to a FocusSession
    fn row_to_session(row: &rusqlite::Row) -> Result<FocusSession, rusqlite::Error> {
        Ok(FocusSession {
            id: row.get(0)?,
            task_id: row.get(1)?,
            duration_minutes: row.get(2)?,
            completed_at: row.get(3)?,
        })
    }

    /// Record a completed focus session and add its minutes to today's log,
    /// in one transaction
    pub fn log_focus_session(
        &self,
        task_id: Option<i64>,
        duration_minutes: i64,
    ) -> Result<FocusSession, DatabaseError> {
        if !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&duration_minutes) {
            return Err(DatabaseError::ValidationError(format!(
                "session duration must be between {MIN_SESSION_MINUTES} and {MAX_SESSION_MINUTES} minutes"
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO focus_sessions (task_id, duration_minutes, completed_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![task_id, duration_minutes, utils::now_string()],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO daily_log (date, tasks_completed, focus_minutes)
             VALUES (?1, 0, ?2)
             ON CONFLICT(date) DO UPDATE SET focus_minutes = focus_minutes + ?2",
            rusqlite::params![utils::today_string(), duration_minutes],
        )?;
        tx.commit()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, duration_minutes, completed_at
             FROM focus_sessions WHERE id = ?1",
        )?;
        stmt.query_row(rusqlite::params![id], Self::row_to_session)
            .map_err(DatabaseError::from)
    }

    /// Get the daily log for a date, returning zeros if no row exists
    pub fn get_daily_log(&self, date: NaiveDate) -> Result<DailyLog, DatabaseError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT date, tasks_completed, focus_minutes FROM daily_log WHERE date = ?1",
        )?;

        let result = stmt.query_row(rusqlite::params![date_str], |row| {
            Ok(DailyLog {
                date: row.get(0)?,
                tasks_completed: row.get(1)?,
                focus_minutes: row.get(2)?,
            })
        });

        match result {
            Ok(log) => Ok(log),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DailyLog {
                date: date_str,
                tasks_completed: 0,
                focus_minutes: 0,
            }),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Helper function to map a row to an AssessmentResult
    fn row_to_assessment(row: &rusqlite::Row) -> Result<AssessmentResult, rusqlite::Error> {
        let type_raw: String = row.get(1)?;
        let assessment_type = AssessmentType::parse(&type_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("unknown assessment type: {type_raw}").into(),
            )
        })?;
        let domain_raw: String = row.get(4)?;
        let domain_scores = serde_json::from_str(&domain_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(AssessmentResult {
            id: row.get(0)?,
            assessment_type,
            score: row.get(2)?,
            max_score: row.get(3)?,
            domain_scores,
            taken_at: row.get(5)?,
        })
    }

    /// Save a completed assessment (append-only) and return the stored result
    pub fn save_assessment(
        &self,
        scored: &ScoredAssessment,
    ) -> Result<AssessmentResult, DatabaseError> {
        let domain_json = serde_json::to_string(&scored.domain_scores)?;
        self.conn.execute(
            "INSERT INTO assessments (type, score, max_score, domain_scores, taken_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                scored.assessment_type.as_str(),
                scored.score,
                scored.max_score,
                domain_json,
                utils::now_string()
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        let mut stmt = self.conn.prepare(
            "SELECT id, type, score, max_score, domain_scores, taken_at
             FROM assessments WHERE id = ?1",
        )?;
        stmt.query_row(rusqlite::params![id], Self::row_to_assessment)
            .map_err(DatabaseError::from)
    }

    /// List past assessment results, most recent first, optionally filtered
    /// by type
    pub fn list_assessments(
        &self,
        assessment_type: Option<AssessmentType>,
        limit: i64,
    ) -> Result<Vec<AssessmentResult>, DatabaseError> {
        let mut query = String::from(
            "SELECT id, type, score, max_score, domain_scores, taken_at FROM assessments",
        );
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        if let Some(atype) = assessment_type {
            query.push_str(" WHERE type = ?");
            params.push(Box::new(atype.as_str()));
        }
        query.push_str(" ORDER BY taken_at DESC, id DESC LIMIT ?");
        params.push(Box::new(limit));

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(AsRef::as_ref).collect();
        let mut stmt = self.conn.prepare(&query)?;
        let results = stmt
            .query_map(params_refs.as_slice(), Self::row_to_assessment)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Build the full status summary for the dashboard
    pub fn status(&self) -> Result<StatusSummary, DatabaseError> {
        let today = utils::today();
        let today_log = self.get_daily_log(today)?;

        // Week totals, starting Monday
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let (week_tasks, week_focus): (i64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(tasks_completed), 0), COALESCE(SUM(focus_minutes), 0)
             FROM daily_log WHERE date >= ?1",
            rusqlite::params![week_start.format("%Y-%m-%d").to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let pending = self.list_tasks(Some(TaskStatus::Pending), None)?;
        let active = self.list_tasks(Some(TaskStatus::Active), None)?;
        let streak = self.calculate_streak(today)?;

        Ok(StatusSummary {
            today: today_log,
            week_tasks_completed: week_tasks,
            week_focus_minutes: week_focus,
            streak_days: streak,
            pending_tasks: pending,
            active_tasks: active,
        })
    }

    /// Count consecutive days (ending today or yesterday) with at least one
    /// task completed
    fn calculate_streak(&self, today: NaiveDate) -> Result<i64, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM daily_log WHERE tasks_completed > 0")?;
        let dates = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                utils::parse_date(&raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(streak_from_dates(&dates, today))
    }
}

/// Streak arithmetic over the set of dates with completions. The streak may
/// start at today or at yesterday: a day with no completions yet does not
/// break a streak that was alive yesterday, but it does not extend it either.
fn streak_from_dates(dates: &HashSet<NaiveDate>, today: NaiveDate) -> i64 {
    if dates.is_empty() {
        return 0;
    }

    let mut check_date = today;
    if !dates.contains(&check_date) {
        check_date -= Duration::days(1);
        if !dates.contains(&check_date) {
            return 0;
        }
    }

    let mut streak = 0;
    while dates.contains(&check_date) {
        streak += 1;
        check_date -= Duration::days(1);
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        utils::parse_date(s).expect("valid test date")
    }

    fn date_set(days: &[&str]) -> HashSet<NaiveDate> {
        days.iter().map(|d| date(d)).collect()
    }

    #[test]
    fn streak_empty_is_zero() {
        assert_eq!(streak_from_dates(&HashSet::new(), date("2025-06-10")), 0);
    }

    #[test]
    fn streak_counts_today_and_yesterday() {
        let dates = date_set(&["2025-06-10", "2025-06-09"]);
        assert_eq!(streak_from_dates(&dates, date("2025-06-10")), 2);
    }

    #[test]
    fn streak_gap_resets_to_zero() {
        // Only an entry from two days ago: gap at both today and yesterday
        let dates = date_set(&["2025-06-08"]);
        assert_eq!(streak_from_dates(&dates, date("2025-06-10")), 0);
    }

    #[test]
    fn streak_survives_one_empty_day() {
        // Nothing completed today, but yesterday's streak still reads as alive
        let dates = date_set(&["2025-06-09", "2025-06-08", "2025-06-07"]);
        assert_eq!(streak_from_dates(&dates, date("2025-06-10")), 3);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let dates = date_set(&["2025-06-10", "2025-06-09", "2025-06-07", "2025-06-06"]);
        assert_eq!(streak_from_dates(&dates, date("2025-06-10")), 2);
    }

    #[test]
    fn streak_single_day_today() {
        let dates = date_set(&["2025-06-10"]);
        assert_eq!(streak_from_dates(&dates, date("2025-06-10")), 1);
    }
}
