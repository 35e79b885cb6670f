//! Security-question password recovery.
//!
//! Answers are compared exactly and case-sensitively, in question order.

pub const QUESTIONS: [&str; 3] = [
    "What is your favorite color?",
    "What city were you born in?",
    "What is the name of your first employer?",
];

pub const MAX_ANSWER_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityAnswers {
    answers: [String; 3],
}

impl SecurityAnswers {
    #[must_use]
    pub const fn new(favorite_color: String, birth_city: String, first_employer: String) -> Self {
        Self {
            answers: [favorite_color, birth_city, first_employer],
        }
    }

    #[must_use]
    pub fn matches(&self, step: usize, answer: &str) -> bool {
        self.answers
            .get(step)
            .is_some_and(|expected| expected == answer)
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[String; 3] {
        &self.answers
    }
}

/// True iff every submitted answer matches, checked in order and stopping at the first mismatch.
#[must_use]
pub fn verify_all(stored: &SecurityAnswers, submitted: [&str; 3]) -> bool {
    submitted
        .iter()
        .enumerate()
        .all(|(step, answer)| stored.matches(step, answer))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Next { question: &'static str },
    Authorized,
    Incorrect,
}

/// Where a session is in the question sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveryProgress {
    username: String,
    step: usize,
    authorized: bool,
}

impl RecoveryProgress {
    #[must_use]
    pub const fn start(username: String) -> Self {
        Self {
            username,
            step: 0,
            authorized: false,
        }
    }

    /// Rebuild from stored columns. An out-of-range step yields `None`.
    #[must_use]
    pub fn from_parts(username: String, step: i16, authorized: bool) -> Option<Self> {
        let step = usize::try_from(step).ok()?;
        if step >= QUESTIONS.len() {
            return None;
        }
        Some(Self {
            username,
            step,
            authorized,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn step_column(&self) -> i16 {
        i16::try_from(self.step).unwrap_or_default()
    }

    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// `None` once every question has been answered.
    #[must_use]
    pub fn current_question(&self) -> Option<&'static str> {
        if self.authorized {
            None
        } else {
            QUESTIONS.get(self.step).copied()
        }
    }

    /// A mismatch leaves the step unchanged; a match advances, and matching the
    /// last question grants the reset.
    pub fn submit(&mut self, stored: &SecurityAnswers, answer: &str) -> AnswerOutcome {
        if self.authorized {
            return AnswerOutcome::Authorized;
        }
        if !stored.matches(self.step, answer) {
            return AnswerOutcome::Incorrect;
        }
        match QUESTIONS.get(self.step + 1) {
            Some(question) => {
                self.step += 1;
                AnswerOutcome::Next { question }
            }
            None => {
                self.authorized = true;
                AnswerOutcome::Authorized
            }
        }
    }
}
