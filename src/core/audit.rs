//! Audit logging - Append-only trail of every state-changing action.
//!
//! Writes are fire-and-forget relative to the operation being audited: callers record an
//! event after their own work has committed, and a failed audit insert is logged but never
//! surfaced. Nothing in this module updates or deletes rows.

use crate::{
    entities::{AuditLog, audit_log},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde_json::Value;
use tracing::warn;

/// Kind of change being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Register,
    Create,
    Delete,
    Mark,
    SelfMark,
    Finalize,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Mark => "mark",
            Self::SelfMark => "self_mark",
            Self::Finalize => "finalize",
        }
    }
}

/// One audit entry before it is written.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub actor_user_id: Option<i64>,
    pub action: AuditAction,
    pub entity_type: &'static str,
    pub entity_id: Option<i64>,
    pub metadata: Option<Value>,
}

impl AuditEvent {
    #[must_use]
    pub const fn new(
        actor_user_id: Option<i64>,
        action: AuditAction,
        entity_type: &'static str,
    ) -> Self {
        Self {
            actor_user_id,
            action,
            entity_type,
            entity_id: None,
            metadata: None,
        }
    }

    #[must_use]
    pub const fn entity(mut self, entity_id: i64) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Appends an event to the audit log.
///
/// Failures are logged at `warn` and swallowed.
pub async fn record<C>(db: &C, event: AuditEvent)
where
    C: ConnectionTrait,
{
    let action = event.action.as_str();
    let entry = audit_log::ActiveModel {
        actor_user_id: Set(event.actor_user_id),
        action: Set(action.to_string()),
        entity_type: Set(event.entity_type.to_string()),
        entity_id: Set(event.entity_id),
        timestamp: Set(chrono::Utc::now()),
        metadata: Set(event.metadata.map(|m| m.to_string())),
        ..Default::default()
    };

    if let Err(e) = entry.insert(db).await {
        warn!(
            "Failed to write audit entry {} {} {:?}: {}",
            action, event.entity_type, event.entity_id, e
        );
    }
}

/// Returns the most recent audit entries, newest first.
pub async fn list_recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<audit_log::Model>> {
    AuditLog::find()
        .order_by_desc(audit_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
