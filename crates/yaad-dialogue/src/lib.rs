//! Dialogue engine for the Yaad Rakhna skill.
//!
//! Classifies platform requests into events, runs the slot-filling state
//! machine, executes its effects against the Item Store and renders the
//! Hindi replies.

pub mod controller;
pub mod error;
pub mod event;
pub mod response;
pub mod skill;
pub mod state_machine;

pub use controller::DialogueController;
pub use error::DialogueError;
pub use event::{AttributeBag, RequestKind, SkillEvent, SkillReply, SkillRequest};
pub use response::{ResponseComposer, SkillResponse};
pub use skill::Skill;
pub use state_machine::{transition, Effect, Prompt, Transition};
