//! Curated encouragement messages grounded in CBT and self-compassion
//! principles. Users can override the built-in list with an
//! `ENCOURAGEMENTS.md` file in the data directory (one bullet per message).

use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::Path;

const FALLBACK_MESSAGES: [&str; 11] = [
    "Starting is the hardest part. You have already done that.",
    "Progress does not have to be perfect to count.",
    "You are allowed to do things slowly.",
    "One small step is still a step.",
    "Rest is not the opposite of productivity. It is part of it.",
    "Doing something imperfectly is better than not doing it at all.",
    "Your pace is valid.",
    "You have gotten through difficult days before. This is one of them.",
    "Be as kind to yourself as you would be to a friend.",
    "You are not lazy. You are dealing with something real.",
    "Showing up -- even like this -- matters.",
];

const BREAK_MESSAGES: [&str; 6] = [
    "Step away from the screen for a moment.",
    "Take a few slow breaths.",
    "Stretch your shoulders and neck.",
    "Look at something far away for twenty seconds.",
    "Get some water if you can.",
    "Close your eyes for a moment. You have earned this pause.",
];

/// The loaded message list. Owned by the front-end and passed where needed,
/// so nothing here is global state.
#[derive(Debug, Clone)]
pub struct Nudges {
    messages: Vec<String>,
}

impl Nudges {
    /// Load messages from an `ENCOURAGEMENTS.md` file if it exists, falling
    /// back to the built-in list.
    pub fn load(path: Option<&Path>) -> Self {
        let messages = path
            .and_then(|p| std::fs::read_to_string(p).ok())
            .map(|text| parse_bullets(&text))
            .filter(|msgs| !msgs.is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGES.iter().map(|s| s.to_string()).collect());
        Self { messages }
    }

    pub fn builtin() -> Self {
        Self::load(None)
    }

    /// Pick a single random encouragement message.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.messages
            .choose(rng)
            .map(String::as_str)
            .unwrap_or("One small step is still a step.")
    }
}

/// Pick a calming message for break time.
pub fn break_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    BREAK_MESSAGES
        .choose(rng)
        .copied()
        .unwrap_or("Take a few slow breaths.")
}

/// Parse bullet points (`- ` lines) from markdown text.
fn parse_bullets(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("- "))
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Write;

    #[test]
    fn builtin_list_is_used_without_a_file() {
        let nudges = Nudges::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let msg = nudges.pick(&mut rng);
        assert!(FALLBACK_MESSAGES.contains(&msg));
    }

    #[test]
    fn bullets_are_parsed_from_markdown() {
        let parsed = parse_bullets("# Title\n\n- First message\n- Second message\nnot a bullet\n-\n");
        assert_eq!(parsed, vec!["First message", "Second message"]);
    }

    #[test]
    fn file_without_bullets_falls_back() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "just prose, no bullets").expect("write fixture");

        let nudges = Nudges::load(Some(file.path()));
        let mut rng = StdRng::seed_from_u64(2);
        assert!(FALLBACK_MESSAGES.contains(&nudges.pick(&mut rng)));
    }

    #[test]
    fn file_bullets_override_builtins() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "- Only message").expect("write fixture");

        let nudges = Nudges::load(Some(file.path()));
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(nudges.pick(&mut rng), "Only message");
    }
}
