pub mod assessments;
pub mod cli;
pub mod config;
pub mod database;
pub mod encouragement;
pub mod models;
pub mod timer;
pub mod utils;

pub use config::AppConfig;
pub use database::Database;
pub use models::{
    AssessmentResult, AssessmentType, DailyLog, FocusSession, ScoredAssessment, StatusSummary,
    Task, TaskStatus,
};
pub use utils::Profile;
