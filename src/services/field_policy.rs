//! Writable-field policy for the `update_field` action.
//!
//! Automations may only write the listed columns per table. Identifiers,
//! project scoping, timestamps, and other engine-internal columns are never
//! listed. Fields addressed as `custom_fields.<key>` bypass the allowlist
//! and merge into the JSON map instead of overwriting a column.

use crate::domain::models::event::EntityType;

/// Prefix that routes a write into the entity's custom-fields JSON map.
pub const CUSTOM_FIELDS_PREFIX: &str = "custom_fields.";

/// Columns an automation may write for the given entity table.
pub fn writable_fields(entity_type: EntityType) -> &'static [&'static str] {
    match entity_type {
        EntityType::Organization => &[
            "name",
            "domain",
            "industry",
            "description",
            "phone",
            "website",
            "owner_id",
        ],
        EntityType::Person => &[
            "first_name",
            "last_name",
            "email",
            "phone",
            "title",
            "owner_id",
        ],
        EntityType::Opportunity => &["name", "stage", "amount", "close_date", "owner_id"],
        EntityType::Rfp => &["title", "status", "due_date", "owner_id"],
        EntityType::Task => &[
            "title",
            "description",
            "due_date",
            "status",
            "priority",
            "assignee_id",
        ],
        EntityType::Meeting => &["title", "meeting_type", "outcome", "scheduled_at", "owner_id"],
        EntityType::Call => &["direction", "disposition", "notes", "owner_id"],
    }
}

/// Whether a plain (non-custom) field may be written on the entity.
pub fn is_writable(entity_type: EntityType, field: &str) -> bool {
    writable_fields(entity_type).contains(&field)
}

/// The column holding the entity's responsible user, written by
/// `assign_owner`.
pub fn owner_field(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Task => "assignee_id",
        _ => "owner_id",
    }
}
