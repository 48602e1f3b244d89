//! SAE numbering engine.
//!
//! Pure computation: no I/O and no configuration. Callers fetch reports and
//! study numbers, join them with [`join_study_numbers`], and hand the result
//! to [`NumberingEngine::number`].

pub mod engine;
pub mod group;
pub mod join;

pub use engine::{NumberingEngine, NumberingOutcome};
pub use group::partition_by_participant;
pub use join::{NumberedRecord, StudyNumbers, join_study_numbers, participant_ids};
