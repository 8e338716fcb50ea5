//! Pure, deterministic sweep logic.
//!
//! Nothing in this module touches the filesystem or spawns processes; the
//! orchestration layer feeds it strings and writes out what comes back.

pub mod batch_name;
pub mod classify;
pub mod params;
pub mod rc;
pub mod template;
