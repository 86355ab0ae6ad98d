use std::collections::BTreeMap;

use momentum::models::{AssessmentType, ScoredAssessment, TaskStatus};
use momentum::{Database, utils};
use tempfile::tempdir;

fn open_db(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("momentum.db");
    Database::new(path.to_str().expect("utf-8 temp path")).expect("open db")
}

#[test]
fn add_and_get_round_trip() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let task = db.add_task("Write tests", None).expect("add task");
    assert_eq!(task.id, 1);
    assert_eq!(task.title, "Write tests");
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.completed_at.is_none());

    let fetched = db.get_task(task.id).expect("get task").expect("task exists");
    assert_eq!(fetched.title, task.title);
}

#[test]
fn get_unknown_task_is_none() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);
    assert!(db.get_task(9999).expect("get task").is_none());
}

#[test]
fn add_task_rejects_blank_title() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);
    assert!(db.add_task("   ", None).is_err());
    assert!(db.list_tasks(None, None).expect("list").is_empty());
}

#[test]
fn list_tasks_filters_by_status_and_parent() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let a = db.add_task("Task A", None).expect("add");
    let b = db.add_task("Task B", None).expect("add");
    db.set_task_active(b.id).expect("activate");
    let sub = db.add_task("Sub-step", Some(a.id)).expect("add sub");

    let pending = db.list_tasks(Some(TaskStatus::Pending), None).expect("list");
    assert_eq!(pending.len(), 2); // Task A and the sub-step
    let active = db.list_tasks(Some(TaskStatus::Active), None).expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "Task B");

    let subs = db.get_subtasks(a.id).expect("subtasks");
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].id, sub.id);
    assert!(subs[0].is_subtask());
}

#[test]
fn complete_task_updates_task_and_daily_log() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let task = db.add_task("Finish", None).expect("add");
    let completed = db
        .complete_task(task.id)
        .expect("complete")
        .expect("task exists");
    assert_eq!(completed.status, TaskStatus::Done);
    assert!(completed.completed_at.is_some());

    let log = db.get_daily_log(utils::today()).expect("daily log");
    assert_eq!(log.tasks_completed, 1);
    assert_eq!(log.focus_minutes, 0);
}

#[test]
fn complete_unknown_task_leaves_daily_log_alone() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    assert!(db.complete_task(42).expect("complete").is_none());

    let log = db.get_daily_log(utils::today()).expect("daily log");
    assert_eq!(log.tasks_completed, 0);
    assert_eq!(log.focus_minutes, 0);
}

#[test]
fn uncomplete_reverts_to_pending() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let task = db.add_task("Flip flop", None).expect("add");
    db.complete_task(task.id).expect("complete");
    let reverted = db
        .uncomplete_task(task.id)
        .expect("uncomplete")
        .expect("task exists");
    assert_eq!(reverted.status, TaskStatus::Pending);
    assert!(reverted.completed_at.is_none());
}

#[test]
fn focus_sessions_accumulate_in_daily_log() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    db.log_focus_session(None, 10).expect("log session");
    db.log_focus_session(None, 15).expect("log session");

    let log = db.get_daily_log(utils::today()).expect("daily log");
    assert_eq!(log.focus_minutes, 25);
    assert_eq!(log.tasks_completed, 0);
}

#[test]
fn focus_session_duration_is_validated() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    assert!(db.log_focus_session(None, 0).is_err());
    assert!(db.log_focus_session(None, 121).is_err());
    assert!(db.log_focus_session(None, 1).is_ok());
    assert!(db.log_focus_session(None, 120).is_ok());

    // Rejected durations never reached the log
    let log = db.get_daily_log(utils::today()).expect("daily log");
    assert_eq!(log.focus_minutes, 121);
}

#[test]
fn daily_log_is_zero_filled_when_absent() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let log = db
        .get_daily_log(utils::parse_date("2020-01-01").expect("date"))
        .expect("daily log");
    assert_eq!(log.date, "2020-01-01");
    assert_eq!(log.tasks_completed, 0);
    assert_eq!(log.focus_minutes, 0);
}

#[test]
fn assessment_round_trip_preserves_domain_scores() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let mut domain_scores = BTreeMap::new();
    domain_scores.insert("a".to_string(), 1);
    domain_scores.insert("b".to_string(), 2);
    let scored = ScoredAssessment {
        assessment_type: AssessmentType::Bdefs,
        score: 3,
        max_score: 60,
        domain_scores: domain_scores.clone(),
    };

    let saved = db.save_assessment(&scored).expect("save");
    assert_eq!(saved.score, 3);
    assert_eq!(saved.max_score, 60);

    let listed = db.list_assessments(None, 10).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].domain_scores, domain_scores);
    assert_eq!(listed[0].assessment_type, AssessmentType::Bdefs);
}

#[test]
fn list_assessments_filters_and_limits() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    for i in 0..3 {
        db.save_assessment(&ScoredAssessment {
            assessment_type: AssessmentType::Bdefs,
            score: 20 + i,
            max_score: 60,
            domain_scores: BTreeMap::new(),
        })
        .expect("save");
    }
    db.save_assessment(&ScoredAssessment {
        assessment_type: AssessmentType::Stroop,
        score: 8,
        max_score: 10,
        domain_scores: BTreeMap::new(),
    })
    .expect("save");

    let bdefs = db
        .list_assessments(Some(AssessmentType::Bdefs), 10)
        .expect("list");
    assert_eq!(bdefs.len(), 3);
    // Most recent first
    assert_eq!(bdefs[0].score, 22);

    let stroop = db
        .list_assessments(Some(AssessmentType::Stroop), 10)
        .expect("list");
    assert_eq!(stroop.len(), 1);

    let limited = db.list_assessments(None, 2).expect("list");
    assert_eq!(limited.len(), 2);
}

#[test]
fn deleting_a_parent_cascades_to_subtasks() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let parent = db.add_task("Parent", None).expect("add");
    let sub = db.add_task("Sub", Some(parent.id)).expect("add sub");

    db.delete_task(parent.id).expect("delete");
    assert!(db.get_task(parent.id).expect("get").is_none());
    assert!(db.get_task(sub.id).expect("get").is_none());
}

#[test]
fn deleting_a_task_detaches_its_focus_sessions() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let task = db.add_task("With sessions", None).expect("add");
    let session = db
        .log_focus_session(Some(task.id), 25)
        .expect("log session");
    assert_eq!(session.task_id, Some(task.id));

    db.delete_task(task.id).expect("delete");

    // The session row survives with task_id cleared
    let task_id: Option<i64> = db
        .conn()
        .query_row(
            "SELECT task_id FROM focus_sessions WHERE id = ?1",
            [session.id],
            |row| row.get(0),
        )
        .expect("session row");
    assert!(task_id.is_none());
}

#[test]
fn status_summary_reflects_activity() {
    let dir = tempdir().expect("temp dir");
    let db = open_db(&dir);

    let a = db.add_task("Done today", None).expect("add");
    let b = db.add_task("Still pending", None).expect("add");
    let c = db.add_task("In progress", None).expect("add");
    db.set_task_active(c.id).expect("activate");
    db.complete_task(a.id).expect("complete");
    db.log_focus_session(Some(c.id), 30).expect("log session");

    let summary = db.status().expect("status");
    assert_eq!(summary.today.tasks_completed, 1);
    assert_eq!(summary.today.focus_minutes, 30);
    // Today falls inside the current Monday-based week
    assert_eq!(summary.week_tasks_completed, 1);
    assert_eq!(summary.week_focus_minutes, 30);
    assert_eq!(summary.streak_days, 1);
    assert_eq!(summary.pending_tasks.len(), 1);
    assert_eq!(summary.pending_tasks[0].id, b.id);
    assert_eq!(summary.active_tasks.len(), 1);
    assert_eq!(summary.active_tasks[0].id, c.id);
}

#[test]
fn schema_creation_is_idempotent() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("momentum.db");

    {
        let db = Database::new(path.to_str().expect("utf-8")).expect("open");
        db.add_task("Survives reopen", None).expect("add");
    }

    let db = Database::new(path.to_str().expect("utf-8")).expect("reopen");
    let tasks = db.list_tasks(None, None).expect("list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Survives reopen");
}
