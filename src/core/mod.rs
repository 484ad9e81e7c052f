//! Core business logic - framework-agnostic operations over the attendance store.
//!
//! Every function takes the database handle explicitly; nothing here keeps state between
//! calls.

/// Session lifecycle marking rules and the staff marking path
pub mod attendance;
/// Append-only audit trail
pub mod audit;
/// Class creation and lookup
pub mod class;
/// Attendance summaries and histories
pub mod report;
/// Student self-service marking with a daily cooldown
pub mod self_mark;
/// One session per class and date
pub mod session;
/// Student roster
pub mod student;
/// Accounts, credentials, and the seeded admin
pub mod user;
