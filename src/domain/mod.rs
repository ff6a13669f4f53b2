//! Domain layer - pure business logic, no I/O.

pub mod foundation;
pub mod retrospective;
