//! Required-field validation and numeric coercion for room drafts.
//!
//! Validation only checks presence, in a fixed order, and reports the first
//! missing field. Turning the numeric strings into integers is a separate
//! step: a present-but-unparsable number is a `CoercionError`, not a
//! `ValidationError`.

use crate::types::{RoomDraft, RoomFields};

/// First required field found missing, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("RoomAlias is required")]
    MissingAlias,
    #[error("RoomName is required")]
    MissingName,
    #[error("RoomTypeId is required")]
    MissingRoomType,
    #[error("RFloorId is required")]
    MissingFloor,
}

/// A numeric field that is present but not a whole number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be a whole number, got {value:?}")]
pub struct CoercionError {
    pub field: &'static str,
    pub value: String,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Check required fields: alias, then name, then room type, then floor.
pub fn validate(draft: &RoomDraft) -> Result<(), ValidationError> {
    if blank(&draft.alias) {
        return Err(ValidationError::MissingAlias);
    }
    if blank(&draft.name) {
        return Err(ValidationError::MissingName);
    }
    if blank(&draft.room_type_id) {
        return Err(ValidationError::MissingRoomType);
    }
    if blank(&draft.floor_id) {
        return Err(ValidationError::MissingFloor);
    }
    Ok(())
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, CoercionError> {
    value.trim().parse().map_err(|_| CoercionError {
        field,
        value: value.to_string(),
    })
}

/// Convert a validated draft's numeric strings. An empty display index is 0.
///
/// Text fields are passed through untouched.
pub fn coerce(draft: &RoomDraft) -> Result<RoomFields, CoercionError> {
    let display_index = if blank(&draft.display_index) {
        0
    } else {
        parse_int("DisplayIndex", &draft.display_index)?
    };
    Ok(RoomFields {
        alias: draft.alias.clone(),
        name: draft.name.clone(),
        room_type_id: parse_int("RoomTypeId", &draft.room_type_id)?,
        floor_id: parse_int("RFloorId", &draft.floor_id)?,
        display_index,
        description: draft.description.clone(),
    })
}
