//! Grid-snake simulation core with a dual-speed movement system.
//!
//! The [`engine`] advances exactly one discrete tick per call and never
//! renders, schedules, or touches storage; a driver owns cadence and drawing
//! and inspects the [`engine::TickOutcome`] of each tick. The [`input`]
//! normalizer turns raw key signals into validated steering between ticks.

pub mod engine;
pub mod field;
pub mod input;
pub mod pacer;
pub mod score;
pub mod view;

pub use engine::{Engine, GameState, TickOutcome};
pub use field::{Field, Pos, Vector};
pub use input::{apply, Applied, Normalizer, Signal};
pub use pacer::{Mode, Pacer};
pub use score::{FileScoreStore, MemoryScoreStore, ScoreStore};
