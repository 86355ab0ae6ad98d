use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "momentum-dev",
            Profile::Prod => "momentum",
        }
    }
}

/// Get the configuration directory path for Momentum.
/// If profile is Dev, uses "momentum-dev" instead of "momentum".
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "momentum", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for Momentum (default database location).
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "momentum", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<chrono::NaiveDate, chrono::ParseError> {
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Today's local calendar date.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Current local timestamp as YYYY-MM-DD HH:MM:SS.
pub fn now_string() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Today's local date as an ISO 8601 string (YYYY-MM-DD)
pub fn today_string() -> String {
    today().format("%Y-%m-%d").to_string()
}
