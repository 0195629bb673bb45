//! Domain types for the room service.
//!
//! # Design
//! `Room` is a record as the service returned it, so it always has an id.
//! A room that has never been persisted only exists as a `RoomDraft`, whose
//! `id` is `None` until the service assigns one. Whether a room is active or
//! deleted is never stored: it is the `Partition` the record was fetched from.
//!
//! The service's JSON field names (including its spellings `RoomAlise` and
//! `Discription`) appear only in serde attributes.

use std::fmt;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by the service on first successful creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub i64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted room as returned by one of the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "RoomID", deserialize_with = "loose_id")]
    pub id: RoomId,
    #[serde(rename = "RoomAlise", default, deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(rename = "RoomName", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "RoomTypeId", default, deserialize_with = "loose_int")]
    pub room_type_id: i64,
    #[serde(rename = "RFloorId", default, deserialize_with = "loose_int")]
    pub floor_id: i64,
    #[serde(rename = "DisplayIndex", default, deserialize_with = "loose_int")]
    pub display_index: i64,
    #[serde(rename = "Discription", default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An integer as the service may send it: a JSON number or its decimal text.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Number(i64),
    Text(String),
}

impl LooseInt {
    /// `None` for blank text.
    fn value<E: de::Error>(self) -> Result<Option<i64>, E> {
        match self {
            LooseInt::Number(n) => Ok(Some(n)),
            LooseInt::Text(s) if s.trim().is_empty() => Ok(None),
            LooseInt::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Str(&s), &"an integer")),
        }
    }
}

/// Lenient integer: `null` and blank text read as 0, numeric text is parsed.
fn loose_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseInt>::deserialize(deserializer)? {
        Some(v) => Ok(v.value::<D::Error>()?.unwrap_or_default()),
        None => Ok(0),
    }
}

/// Like `loose_int`, but an id has no default.
fn loose_id<'de, D>(deserializer: D) -> Result<RoomId, D::Error>
where
    D: Deserializer<'de>,
{
    LooseInt::deserialize(deserializer)?
        .value::<D::Error>()?
        .map(RoomId)
        .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(""), &"a room id"))
}

/// Which list a room lives in on the service side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Active,
    Deleted,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Active => write!(f, "active"),
            Partition::Deleted => write!(f, "deleted"),
        }
    }
}

/// A candidate record as typed into a form: every field is a string.
///
/// `id` is `None` for a room that has not been created yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomDraft {
    pub id: Option<RoomId>,
    pub alias: String,
    pub name: String,
    pub room_type_id: String,
    pub floor_id: String,
    pub display_index: String,
    pub description: String,
}

impl From<&Room> for RoomDraft {
    fn from(room: &Room) -> Self {
        Self {
            id: Some(room.id),
            alias: room.alias.clone(),
            name: room.name.clone(),
            room_type_id: room.room_type_id.to_string(),
            floor_id: room.floor_id.to_string(),
            display_index: room.display_index.to_string(),
            description: room.description.clone(),
        }
    }
}

/// Validated and coerced room fields, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomFields {
    pub alias: String,
    pub name: String,
    pub room_type_id: i64,
    pub floor_id: i64,
    pub display_index: i64,
    pub description: String,
}

/// A state-changing request against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(RoomFields),
    Update { id: RoomId, fields: RoomFields },
    SoftDelete(RoomId),
    Restore(RoomId),
}

impl Mutation {
    /// The partition whose listing is stale once this mutation succeeds.
    pub fn partition(&self) -> Partition {
        match self {
            Mutation::Create(_) | Mutation::Update { .. } | Mutation::SoftDelete(_) => {
                Partition::Active
            }
            Mutation::Restore(_) => Partition::Deleted,
        }
    }

    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            Mutation::Create(_) => None,
            Mutation::Update { id, .. } | Mutation::SoftDelete(id) | Mutation::Restore(id) => {
                Some(*id)
            }
        }
    }

    /// Short name used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update { .. } => "update",
            Mutation::SoftDelete(_) => "soft-delete",
            Mutation::Restore(_) => "restore",
        }
    }
}

/// What the service said about a mutation it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Explicit `Success: true`, or no summary at all under the
    /// absent-summary policy.
    Accepted { message: Option<String> },
    /// Explicit `Success: false`.
    Rejected { message: String },
}
