//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance;
pub mod audit_log;
pub mod class;
pub mod session;
pub mod student;
pub mod user;

// Re-export specific types to avoid conflicts
pub use attendance::{
    AttendanceStatus, Column as AttendanceColumn, Entity as Attendance, Model as AttendanceModel,
};
pub use audit_log::{Column as AuditLogColumn, Entity as AuditLog, Model as AuditLogModel};
pub use class::{Column as ClassColumn, Entity as Class, Model as ClassModel};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel, SessionStatus};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
