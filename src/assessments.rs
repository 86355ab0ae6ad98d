//! Self-assessment instruments for executive-function screening.
//!
//! Two instruments are provided:
//!
//! * A brief BDEFS-style self-report questionnaire: five domains with three
//!   items each, rated on a 1-4 Likert scale.
//! * A Stroop colour-word test: a timed task where the participant names the
//!   ink colour of colour words printed in a mismatched colour.
//!
//! Everything here is pure; persistence lives in [`crate::database`].

use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeMap;

use crate::models::{AssessmentType, ScoredAssessment};

// ---------------------------------------------------------------------------
// BDEFS-style self-report
// ---------------------------------------------------------------------------

/// Likert scale labels, indexed by rating 1-4.
pub const BDEFS_SCALE: [(i64, &str); 4] = [
    (1, "Never"),
    (2, "Sometimes"),
    (3, "Often"),
    (4, "Very Often"),
];

pub const BDEFS_MIN_PER_ITEM: i64 = 1;
pub const BDEFS_MAX_PER_ITEM: i64 = 4;

/// The five fixed domains with their question sets, in presentation order.
pub const BDEFS_QUESTIONS: [(&str, [&str; 3]); 5] = [
    (
        "Time Management",
        [
            "I have difficulty estimating how long a task will take.",
            "I procrastinate or put off doing things until the last minute.",
            "I have trouble completing tasks on time.",
        ],
    ),
    (
        "Organisation & Problem-Solving",
        [
            "I find it hard to organise my thoughts before starting a task.",
            "I struggle to break large projects into manageable steps.",
            "I have trouble keeping my workspace or living area tidy.",
        ],
    ),
    (
        "Self-Restraint",
        [
            "I act on impulse without thinking about the consequences.",
            "I have difficulty waiting my turn or being patient.",
            "I interrupt others or blurt things out before they finish speaking.",
        ],
    ),
    (
        "Self-Motivation",
        [
            "I lack the drive to start tasks even when I know they are important.",
            "I find it hard to sustain effort on tasks that are not immediately rewarding.",
            "I need external pressure (deadlines, others reminding me) to get things done.",
        ],
    ),
    (
        "Emotion Regulation",
        [
            "I become frustrated or upset more easily than others.",
            "I have trouble calming myself down when I am angry or stressed.",
            "My emotional reactions feel out of proportion to the situation.",
        ],
    ),
];

/// Maximum possible BDEFS total score.
pub fn bdefs_max_score() -> i64 {
    let n_items: usize = BDEFS_QUESTIONS.iter().map(|(_, qs)| qs.len()).sum();
    n_items as i64 * BDEFS_MAX_PER_ITEM
}

/// Score a completed BDEFS questionnaire.
///
/// `answers` maps each domain name to its list of 1-4 responses. Returns a
/// [`ScoredAssessment`] with per-domain sums, ready to be saved.
pub fn score_bdefs(answers: &BTreeMap<String, Vec<i64>>) -> ScoredAssessment {
    let mut domain_scores = BTreeMap::new();
    let mut total = 0;
    for (domain, ratings) in answers {
        let domain_sum: i64 = ratings.iter().sum();
        domain_scores.insert(domain.clone(), domain_sum);
        total += domain_sum;
    }

    ScoredAssessment {
        assessment_type: AssessmentType::Bdefs,
        score: total,
        max_score: bdefs_max_score(),
        domain_scores,
    }
}

/// Return a plain-English interpretation of a BDEFS total score.
pub fn interpret_bdefs(score: i64, max_score: i64) -> &'static str {
    let pct = score as f64 / max_score as f64 * 100.0;
    if pct <= 25.0 {
        "Minimal difficulties -- your executive functioning appears relatively strong."
    } else if pct <= 50.0 {
        "Mild difficulties -- some areas may benefit from targeted strategies."
    } else if pct <= 75.0 {
        "Moderate difficulties -- structured routines and support strategies are recommended."
    } else {
        "Significant difficulties -- consider seeking professional assessment and support."
    }
}

// ---------------------------------------------------------------------------
// Stroop colour-word test
// ---------------------------------------------------------------------------

pub const STROOP_COLOURS: [&str; 4] = ["red", "green", "blue", "yellow"];
pub const STROOP_DEFAULT_TRIALS: usize = 10;

/// A single Stroop trial: a colour word displayed in a different ink colour.
/// The ink colour is the correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StroopTrial {
    pub word: &'static str,
    pub ink_colour: &'static str,
}

/// Aggregate result of a Stroop test session.
#[derive(Debug, Clone, Default)]
pub struct StroopOutcome {
    pub trials: i64,
    pub correct: i64,
    pub total_time_s: f64,
    pub per_trial: Vec<(bool, f64)>,
}

impl StroopOutcome {
    /// Percentage of trials answered correctly; 0 when no trials were run.
    pub fn accuracy_pct(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.correct as f64 / self.trials as f64 * 100.0
    }

    /// Mean response time in seconds; 0 when no trials were run.
    pub fn avg_time_s(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.total_time_s / self.trials as f64
    }

    /// Mean response time in whole milliseconds.
    pub fn avg_time_ms(&self) -> i64 {
        (self.avg_time_s() * 1000.0) as i64
    }
}

/// Generate `n` Stroop trials. The ink colour is always drawn from the
/// palette excluding the word itself, so word != ink_colour holds for every
/// trial.
pub fn generate_stroop_trials<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<StroopTrial> {
    (0..n)
        .map(|_| {
            let word = *STROOP_COLOURS.choose(rng).expect("palette is non-empty");
            let mismatched: Vec<&'static str> = STROOP_COLOURS
                .iter()
                .copied()
                .filter(|c| *c != word)
                .collect();
            let ink_colour = *mismatched.choose(rng).expect("palette has more than one colour");
            StroopTrial { word, ink_colour }
        })
        .collect()
}

/// Whether a typed answer names the trial's ink colour (case-insensitive,
/// trimmed).
pub fn stroop_answer_correct(trial: &StroopTrial, answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(trial.ink_colour)
}

/// Convert a finished Stroop session into a [`ScoredAssessment`].
pub fn score_stroop(outcome: &StroopOutcome) -> ScoredAssessment {
    let mut domain_scores = BTreeMap::new();
    domain_scores.insert("correct".to_string(), outcome.correct);
    domain_scores.insert("trials".to_string(), outcome.trials);
    domain_scores.insert("avg_time_ms".to_string(), outcome.avg_time_ms());

    ScoredAssessment {
        assessment_type: AssessmentType::Stroop,
        score: outcome.correct,
        max_score: outcome.trials,
        domain_scores,
    }
}

/// Return a plain-English interpretation of Stroop performance, combining an
/// accuracy band with a speed band.
pub fn interpret_stroop(correct: i64, trials: i64, avg_ms: i64) -> String {
    let pct = if trials > 0 {
        correct as f64 / trials as f64 * 100.0
    } else {
        0.0
    };

    let accuracy = if pct >= 90.0 {
        "Excellent accuracy -- strong inhibitory control."
    } else if pct >= 70.0 {
        "Good accuracy -- inhibitory control is adequate."
    } else if pct >= 50.0 {
        "Moderate accuracy -- you may benefit from impulse-management strategies."
    } else {
        "Low accuracy -- inhibitory control may be an area to work on."
    };

    let speed = if avg_ms <= 1000 {
        "Your response time is fast."
    } else if avg_ms <= 2000 {
        "Your response time is average."
    } else {
        "Your response time is on the slower side; take your time and focus on accuracy."
    };

    format!("{accuracy} {speed}")
}

// ---------------------------------------------------------------------------
// Instruction text shared across front-ends
// ---------------------------------------------------------------------------

pub const BDEFS_INSTRUCTIONS: &str = "This is a brief executive-function self-assessment based on the \
Barkley Deficits in Executive Functioning Scale (BDEFS).\n\n\
It covers five domains: Time Management, Organisation & Problem-Solving, \
Self-Restraint, Self-Motivation, and Emotion Regulation.\n\n\
For each statement, rate how often it applies to you:\n\
  1 = Never   2 = Sometimes   3 = Often   4 = Very Often\n\n\
There are 15 questions and it takes about 2-3 minutes. \
Your results are stored locally and never shared.";

pub const STROOP_INSTRUCTIONS: &str = "The Stroop test measures inhibitory control -- your ability to override \
an automatic response.\n\n\
You will see a colour word (e.g. RED) displayed in a different ink colour \
(e.g. blue). Your task is to type the INK COLOUR, not the word itself.\n\n\
There are 10 trials. Try to answer as quickly and accurately as you can.\n\n\
Your accuracy and response time are recorded. Results are stored locally \
and never shared.";
