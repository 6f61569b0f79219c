#![warn(clippy::all, missing_docs)]

//! Core domain logic for the timestui multiplication trainer.
//!
//! This crate hosts the problem-generation and scoring state machine,
//! the answer-entry buffer, and configuration handling used by the
//! terminal UI and any future frontends.

pub mod config;
pub mod game;
pub mod input;

pub use config::AppConfig;
pub use game::{
    Difficulty, Feedback, GameSnapshot, GameState, Problem, SessionPhase, Tone, QUESTION_QUOTA,
};
pub use input::{AnswerPad, MAX_ANSWER_LEN};
