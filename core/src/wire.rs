//! Request payloads and response envelopes as the service speaks them.
//!
//! Nothing outside `client` sees these shapes: requests leave as a JSON
//! string, responses come back as `Vec<Room>` or `MutationOutcome`.
//! Decoding is total. Every well-formed JSON object maps to a typed value,
//! with missing pieces resolved by the rules below instead of by probing at
//! call sites.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Mutation, MutationOutcome, Partition, Room, RoomId};

/// Policy for mutation responses that carry no `Success` flag (no `result`,
/// an empty `result`, or a first element without `Success`). The service has
/// always been read this way; flip it to treat silence as failure.
pub const ABSENT_SUMMARY_MEANS_SUCCESS: bool = true;

/// Numeric discriminator carried in `action_flag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum ActionFlag {
    /// Create when `RoomID` is absent, update otherwise.
    Upsert = 1,
    SoftDelete = 3,
    Restore = 4,
}

impl ActionFlag {
    pub(crate) fn of(mutation: &Mutation) -> Self {
        match mutation {
            Mutation::Create(_) | Mutation::Update { .. } => ActionFlag::Upsert,
            Mutation::SoftDelete(_) => ActionFlag::SoftDelete,
            Mutation::Restore(_) => ActionFlag::Restore,
        }
    }
}

#[derive(Serialize)]
struct UpsertPayload<'a> {
    #[serde(rename = "RoomID", skip_serializing_if = "Option::is_none")]
    id: Option<RoomId>,
    #[serde(rename = "RoomAlise")]
    alias: &'a str,
    #[serde(rename = "RoomName")]
    name: &'a str,
    #[serde(rename = "RoomTypeId")]
    room_type_id: i64,
    #[serde(rename = "RFloorId")]
    floor_id: i64,
    #[serde(rename = "DisplayIndex")]
    display_index: i64,
    #[serde(rename = "Discription")]
    description: &'a str,
    action_flag: u8,
    #[serde(rename = "CreatedBy")]
    created_by: i64,
}

#[derive(Serialize)]
struct LifecyclePayload {
    #[serde(rename = "RoomID")]
    id: RoomId,
    action_flag: u8,
}

/// Operation-specific fields of a mutation request.
pub(crate) fn mutation_fields(mutation: &Mutation, created_by: i64) -> Result<Value, serde_json::Error> {
    let flag = ActionFlag::of(mutation) as u8;
    let (id, fields) = match mutation {
        Mutation::Create(fields) => (None, fields),
        Mutation::Update { id, fields } => (Some(*id), fields),
        Mutation::SoftDelete(id) | Mutation::Restore(id) => {
            return serde_json::to_value(LifecyclePayload { id: *id, action_flag: flag });
        }
    };
    serde_json::to_value(UpsertPayload {
        id,
        alias: &fields.alias,
        name: &fields.name,
        room_type_id: fields.room_type_id,
        floor_id: fields.floor_id,
        display_index: fields.display_index,
        description: &fields.description,
        action_flag: flag,
        created_by,
    })
}

/// Merge the credential fragment with operation fields. Operation fields win
/// on key collisions.
pub(crate) fn with_credentials(credentials: &Map<String, Value>, fields: Value) -> Value {
    let mut body = credentials.clone();
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    Value::Object(body)
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Value,
}

fn collection_key(partition: Partition) -> &'static str {
    match partition {
        Partition::Active => "rooms",
        Partition::Deleted => "deleted_rooms",
    }
}

/// Decode a list response. A missing or non-object `result`, or a missing or
/// `null` collection, is an empty list.
pub(crate) fn decode_rooms(body: &str, partition: Partition) -> Result<Vec<Room>, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let Value::Object(mut result) = envelope.result else {
        return Ok(Vec::new());
    };
    match result.remove(collection_key(partition)) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(rooms) => serde_json::from_value(rooms),
    }
}

/// The `{Success, Message}` object leading a mutation response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) success: Option<bool>,
    pub(crate) message: Option<String>,
}

/// Decode a mutation response into its leading summary, if any.
pub(crate) fn decode_summary(body: &str) -> Result<Option<Summary>, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let Value::Array(items) = envelope.result else {
        return Ok(None);
    };
    let Some(Value::Object(first)) = items.into_iter().next() else {
        return Ok(None);
    };
    let success = match first.get("Success") {
        None | Some(Value::Null) => None,
        Some(value) => Some(success_flag(value)?),
    };
    let message = first
        .get("Message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    Ok(Some(Summary { success, message }))
}

/// `Success` as booleans, 0/1, or their string forms.
fn success_flag(value: &Value) -> Result<bool, serde_json::Error> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("unrecognised Success value {other:?}"))),
        },
        other => Err(serde::de::Error::custom(format!("unrecognised Success value {other}"))),
    }
}

fn rejection_fallback(mutation: &Mutation) -> &'static str {
    match mutation {
        Mutation::Create(_) | Mutation::Update { .. } => "Save failed",
        Mutation::SoftDelete(_) => "Delete failed",
        Mutation::Restore(_) => "Restore failed",
    }
}

/// Apply the success policy to a decoded summary.
pub(crate) fn outcome(mutation: &Mutation, summary: Option<Summary>) -> MutationOutcome {
    let Summary { success, message } = summary.unwrap_or_default();
    if success.unwrap_or(ABSENT_SUMMARY_MEANS_SUCCESS) {
        MutationOutcome::Accepted { message }
    } else {
        MutationOutcome::Rejected {
            message: message.unwrap_or_else(|| rejection_fallback(mutation).to_string()),
        }
    }
}
