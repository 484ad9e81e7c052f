//! Audit log entity - Append-only record of mutating actions.
//!
//! Rows are only ever inserted. The actor is optional because registration happens
//! before any user is authenticated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub actor_user_id: Option<i64>,
    /// Action token, e.g. `"mark"` or `"finalize"`
    pub action: String,
    /// Entity token, e.g. `"attendance"` or `"session"`
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub timestamp: DateTimeUtc,
    /// Free-form JSON text describing the change
    pub metadata: Option<String>,
}

/// `AuditLog` has no enforced relationships so entries outlive the rows they describe
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
