use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Active,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Active => "active",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "active" => Some(TaskStatus::Active),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// A single task or sub-task (one level of nesting via parent_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub parent_id: Option<i64>,
    pub status: TaskStatus,
    pub created_at: String,           // YYYY-MM-DD HH:MM:SS
    pub completed_at: Option<String>, // YYYY-MM-DD HH:MM:SS
}

impl Task {
    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A completed focus (pomodoro) session. Logged only when the countdown
/// finishes naturally, never on cancel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: i64,
    pub task_id: Option<i64>,
    pub duration_minutes: i64,
    pub completed_at: String, // YYYY-MM-DD HH:MM:SS
}

/// Aggregated daily activity counters, keyed by calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: String, // YYYY-MM-DD
    pub tasks_completed: i64,
    pub focus_minutes: i64,
}

/// Dashboard data for the status command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSummary {
    pub today: DailyLog,
    pub week_tasks_completed: i64,
    pub week_focus_minutes: i64,
    pub streak_days: i64,
    pub pending_tasks: Vec<Task>,
    pub active_tasks: Vec<Task>,
}

/// Available self-assessment instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    Bdefs,
    Stroop,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Bdefs => "bdefs",
            AssessmentType::Stroop => "stroop",
        }
    }

    pub fn parse(s: &str) -> Option<AssessmentType> {
        match s {
            "bdefs" => Some(AssessmentType::Bdefs),
            "stroop" => Some(AssessmentType::Stroop),
            _ => None,
        }
    }
}

/// A stored self-assessment result. Immutable once saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: i64,
    pub assessment_type: AssessmentType,
    pub score: i64,
    pub max_score: i64,
    pub domain_scores: BTreeMap<String, i64>,
    pub taken_at: String, // YYYY-MM-DD HH:MM:SS
}

/// Output of the scoring engine, ready to be saved to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAssessment {
    pub assessment_type: AssessmentType,
    pub score: i64,
    pub max_score: i64,
    pub domain_scores: BTreeMap<String, i64>,
}

/// Configuration for a focus or break countdown.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    pub minutes: i64,
    pub label: String,
    pub task_id: Option<i64>,
    pub is_break: bool,
}

impl TimerConfig {
    pub fn focus(minutes: i64, task_id: Option<i64>) -> Self {
        Self {
            minutes,
            label: "Focus".to_string(),
            task_id,
            is_break: false,
        }
    }

    pub fn take_break(minutes: i64) -> Self {
        Self {
            minutes,
            label: "Break".to_string(),
            task_id: None,
            is_break: true,
        }
    }
}
