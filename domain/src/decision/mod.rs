//! Decision domain
//!
//! Two participants resolve a choice through one of two protocols:
//!
//! ```text
//! vote:  round 1 ──both voted──▶ completed (trigger's option)
//!
//! poll:  round 1 ──agree──▶ completed
//!          │ disagree: keep the 2 voted options
//!          ▼
//!        round 2 ──agree──▶ completed
//!          │ disagree
//!          ▼
//!        round 3 ──partner votes──▶ completed
//! ```
//!
//! - [`entities`]: `Decision`, `DecisionOption`, status and kind
//! - [`vote`]: ledger rows and per-round `Tally`
//! - [`round`]: completion rules per round
//! - [`progression`]: validation of an elimination step
//! - [`outcome`]: what a completed round leads to

pub mod entities;
pub mod outcome;
pub mod progression;
pub mod round;
pub mod vote;
