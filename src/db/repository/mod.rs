//! Repository layer — entity-scoped database operations.
//!
//! Functions take a borrowed `Connection` so callers decide how the
//! connection is shared (see `CoreState`).

mod patient;

pub use patient::*;
