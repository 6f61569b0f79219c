//! Problem generation and session scoring.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of correct answers that finishes a session.
pub const QUESTION_QUOTA: u32 = 10;

/// Named preset controlling the operand draw range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Operands drawn from 0..=5.
    Easy,
    /// Operands drawn from 3..=8.
    Medium,
    /// Operands drawn from 3..=12.
    Hard,
}

impl Difficulty {
    /// All difficulties in display order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Inclusive bounds both operands are drawn from.
    pub fn bounds(self) -> (u8, u8) {
        match self {
            Difficulty::Easy => (0, 5),
            Difficulty::Medium => (3, 8),
            Difficulty::Hard => (3, 12),
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a difficulty name cannot be recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}', expected easy, medium or hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(input.to_string())),
        }
    }
}

/// The current multiplication problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Left operand.
    pub a: u8,
    /// Right operand.
    pub b: u8,
}

impl Problem {
    /// Draw a fresh problem, both operands independent and uniform within
    /// the inclusive bounds.
    pub fn roll(rng: &mut impl Rng, bounds: (u8, u8)) -> Self {
        let (lo, hi) = bounds;
        Self {
            a: rng.random_range(lo..=hi),
            b: rng.random_range(lo..=hi),
        }
    }

    /// The expected product.
    pub fn answer(&self) -> u32 {
        u32::from(self.a) * u32::from(self.b)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.a, self.b)
    }
}

/// Semantic colour class attached to feedback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Nothing graded yet.
    Neutral,
    /// Last submission was correct.
    Success,
    /// Last submission was wrong.
    Danger,
}

/// Last grading signal shown to the player. Persists until the next graded
/// submission or a session reset; an unparseable submission leaves it alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feedback {
    /// No submission graded yet.
    #[default]
    Idle,
    /// "Correct!"
    Correct,
    /// "Please try again"
    TryAgain,
}

impl Feedback {
    /// Display text for the feedback line.
    pub fn text(self) -> &'static str {
        match self {
            Feedback::Idle => " ",
            Feedback::Correct => "Correct!",
            Feedback::TryAgain => "Please try again",
        }
    }

    /// Semantic tone for the presentation layer.
    pub fn tone(self) -> Tone {
        match self {
            Feedback::Idle => Tone::Neutral,
            Feedback::Correct => Tone::Success,
            Feedback::TryAgain => Tone::Danger,
        }
    }
}

/// Session-level state machine. `Playing → Complete` fires exactly when the
/// quota'th correct answer is recorded; the only way back is [`GameState::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Questions remain.
    Playing,
    /// The quota has been reached.
    Complete,
}

/// Mutable state for one practice session.
///
/// Owned by the application loop; the presentation layer only ever sees
/// read-only [`GameSnapshot`]s taken between mutations.
#[derive(Debug, Clone)]
pub struct GameState {
    problem: Problem,
    num_correct: u32,
    num_questions: u32,
    difficulty: Difficulty,
    phase: SessionPhase,
    feedback: Feedback,
}

impl GameState {
    /// Start a session at the given difficulty with a freshly drawn problem.
    pub fn new(difficulty: Difficulty) -> Self {
        let mut rng = rand::rng();
        Self {
            problem: Problem::roll(&mut rng, difficulty.bounds()),
            num_correct: 0,
            num_questions: QUESTION_QUOTA,
            difficulty,
            phase: SessionPhase::Playing,
            feedback: Feedback::Idle,
        }
    }

    /// Overwrite the current problem with a fresh draw from the active
    /// difficulty's bounds. No other field changes.
    pub fn generate_problem(&mut self) {
        let mut rng = rand::rng();
        self.problem = Problem::roll(&mut rng, self.difficulty.bounds());
    }

    /// Switch difficulty for future draws. The current problem and the
    /// running score are intentionally left untouched.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Return the session to its initial score state and draw a new
    /// problem. Difficulty is kept.
    pub fn reset(&mut self) {
        self.num_correct = 0;
        self.phase = SessionPhase::Playing;
        self.feedback = Feedback::Idle;
        self.generate_problem();
    }

    /// Record the outcome of a graded submission.
    ///
    /// A correct answer increments the score and either completes the
    /// session (leaving the final problem on screen) or draws the next
    /// problem. A wrong answer only flips the feedback signal. Once the
    /// session is complete, further calls are ignored until [`Self::reset`].
    pub fn record_answer(&mut self, correct: bool) {
        if self.phase == SessionPhase::Complete {
            return;
        }
        if !correct {
            self.feedback = Feedback::TryAgain;
            return;
        }
        self.feedback = Feedback::Correct;
        self.num_correct += 1;
        if self.num_correct >= self.num_questions {
            self.phase = SessionPhase::Complete;
        } else {
            self.generate_problem();
        }
    }

    /// Current problem.
    pub fn problem(&self) -> Problem {
        self.problem
    }

    /// Correct answers so far.
    pub fn num_correct(&self) -> u32 {
        self.num_correct
    }

    /// Question quota for this session.
    pub fn num_questions(&self) -> u32 {
        self.num_questions
    }

    /// Active difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Session phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True once the quota has been reached.
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Last grading signal.
    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Running score as shown in the header, e.g. `3/10`.
    pub fn score_line(&self) -> String {
        format!("{}/{}", self.num_correct, self.num_questions)
    }

    /// Read-only view for the presentation layer. `answer_entry` is the
    /// in-progress buffer owned by the input side.
    pub fn snapshot(&self, answer_entry: &str) -> GameSnapshot {
        GameSnapshot {
            problem: self.problem,
            answer_entry: answer_entry.to_string(),
            feedback: self.feedback,
            score_line: self.score_line(),
            difficulty: self.difficulty,
            complete: self.is_complete(),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_problem(&mut self, a: u8, b: u8) {
        self.problem = Problem { a, b };
    }

    #[cfg(test)]
    pub(crate) fn force_score(&mut self, num_correct: u32) {
        self.num_correct = num_correct;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// Immutable view of everything the presentation layer draws.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    /// Current operand pair.
    pub problem: Problem,
    /// Buffer contents, empty until the player types.
    pub answer_entry: String,
    /// Last grading signal.
    pub feedback: Feedback,
    /// Header score string, e.g. `3/10`.
    pub score_line: String,
    /// Active difficulty.
    pub difficulty: Difficulty,
    /// True on the celebratory screen.
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_bounds(problem: Problem, bounds: (u8, u8)) -> bool {
        let (lo, hi) = bounds;
        (lo..=hi).contains(&problem.a) && (lo..=hi).contains(&problem.b)
    }

    #[test]
    fn operands_stay_within_difficulty_bounds() {
        for difficulty in Difficulty::ALL {
            let mut game = GameState::new(Difficulty::Easy);
            game.set_difficulty(difficulty);
            for _ in 0..200 {
                game.generate_problem();
                assert!(
                    in_bounds(game.problem(), difficulty.bounds()),
                    "{:?} outside bounds for {difficulty}",
                    game.problem()
                );
            }
        }
    }

    #[test]
    fn correct_answer_increments_and_draws_next() {
        let mut game = GameState::new(Difficulty::Hard);
        game.force_problem(3, 4);
        game.record_answer(true);
        assert_eq!(game.num_correct(), 1);
        assert_eq!(game.feedback(), Feedback::Correct);
        assert_eq!(game.phase(), SessionPhase::Playing);
        assert!(in_bounds(game.problem(), Difficulty::Hard.bounds()));
    }

    #[test]
    fn wrong_answer_changes_nothing_but_feedback() {
        let mut game = GameState::new(Difficulty::Easy);
        game.force_problem(3, 4);
        game.force_score(5);
        game.record_answer(false);
        assert_eq!(game.num_correct(), 5);
        assert_eq!(game.phase(), SessionPhase::Playing);
        assert_eq!(game.feedback(), Feedback::TryAgain);
        assert_eq!(game.problem(), Problem { a: 3, b: 4 });
    }

    #[test]
    fn tenth_correct_answer_completes_without_regenerating() {
        let mut game = GameState::new(Difficulty::Medium);
        game.force_problem(7, 8);
        game.force_score(QUESTION_QUOTA - 1);
        game.record_answer(true);
        assert_eq!(game.num_correct(), QUESTION_QUOTA);
        assert!(game.is_complete());
        // The final problem stays on screen under the trophy.
        assert_eq!(game.problem(), Problem { a: 7, b: 8 });
    }

    #[test]
    fn answers_after_completion_are_ignored() {
        let mut game = GameState::new(Difficulty::Easy);
        game.force_score(QUESTION_QUOTA - 1);
        game.record_answer(true);
        assert!(game.is_complete());

        game.record_answer(true);
        assert_eq!(game.num_correct(), QUESTION_QUOTA);
        assert!(game.is_complete());
    }

    #[test]
    fn reset_restores_initial_score_state() {
        let mut game = GameState::new(Difficulty::Hard);
        game.force_problem(5, 5);
        game.force_score(QUESTION_QUOTA - 1);
        game.record_answer(true);
        assert!(game.is_complete());

        game.reset();
        assert_eq!(game.num_correct(), 0);
        assert_eq!(game.phase(), SessionPhase::Playing);
        assert_eq!(game.feedback(), Feedback::Idle);
        assert_eq!(game.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn difficulty_change_keeps_score_and_problem() {
        let mut game = GameState::new(Difficulty::Easy);
        game.force_problem(2, 2);
        game.force_score(4);
        game.set_difficulty(Difficulty::Hard);
        assert_eq!(game.num_correct(), 4);
        assert_eq!(game.problem(), Problem { a: 2, b: 2 });
        assert_eq!(game.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn difficulty_round_trips_through_str() {
        for difficulty in Difficulty::ALL {
            let parsed: Difficulty = difficulty.label().parse().unwrap();
            assert_eq!(parsed, difficulty);
        }
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn score_line_matches_header_format() {
        let mut game = GameState::new(Difficulty::Easy);
        game.force_score(3);
        assert_eq!(game.score_line(), "3/10");
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut game = GameState::new(Difficulty::Medium);
        game.force_problem(6, 7);
        let snap = game.snapshot("42");
        assert_eq!(snap.problem.answer(), 42);
        assert_eq!(snap.answer_entry, "42");
        assert_eq!(snap.score_line, "0/10");
        assert!(!snap.complete);
    }
}
