//! Blocking countdown used by the focus and break commands. The caller logs
//! a focus session only after this returns, so an interrupted process never
//! records a session.

use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::models::TimerConfig;

/// Run a countdown to completion, ticking once per second with an in-place
/// remaining-time display and a terminal bell at the end.
pub fn run_timer(config: &TimerConfig) {
    let total_seconds = config.minutes * 60;
    let label = match config.task_id {
        Some(task_id) => format!("{} (task #{task_id})", config.label),
        None => config.label.clone(),
    };

    let mut stdout = std::io::stdout();
    for remaining in (1..=total_seconds).rev() {
        print!("\r  {label}: {} remaining ", format_clock(remaining));
        let _ = stdout.flush();
        thread::sleep(Duration::from_secs(1));
    }
    // Bell notification, then clear the countdown line
    println!("\r  {label}: done.\u{7}                ");
}

/// Format a second count as MM:SS (or H:MM:SS past an hour).
pub fn format_clock(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(15 * 60), "15:00");
        assert_eq!(format_clock(120 * 60), "2:00:00");
    }
}
