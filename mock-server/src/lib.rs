use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    #[serde(rename = "RoomID")]
    pub id: i64,
    #[serde(rename = "RoomAlise")]
    pub alias: String,
    #[serde(rename = "RoomName")]
    pub name: String,
    #[serde(rename = "RoomTypeId")]
    pub room_type_id: i64,
    #[serde(rename = "RFloorId")]
    pub floor_id: i64,
    #[serde(rename = "DisplayIndex")]
    pub display_index: i64,
    #[serde(rename = "Discription")]
    pub description: String,
}

/// Body of `save_room_demo.php`. Credential keys ride along and are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SaveRoom {
    #[serde(rename = "RoomID", default)]
    pub id: Option<i64>,
    #[serde(rename = "RoomAlise", default)]
    pub alias: Option<String>,
    #[serde(rename = "RoomName", default)]
    pub name: Option<String>,
    #[serde(rename = "RoomTypeId", default)]
    pub room_type_id: Option<i64>,
    #[serde(rename = "RFloorId", default)]
    pub floor_id: Option<i64>,
    #[serde(rename = "DisplayIndex", default)]
    pub display_index: Option<i64>,
    #[serde(rename = "Discription", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action_flag: Option<u8>,
    #[serde(rename = "CreatedBy", default)]
    pub created_by: Option<i64>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Summary {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "RoomID", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Summary {
    fn ok(message: &str, id: i64) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            id: Some(id),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            id: None,
        }
    }
}

#[derive(Clone, Debug)]
struct StoredRoom {
    room: Room,
    deleted: bool,
}

/// Rooms in creation order. Nothing is ever removed.
#[derive(Debug, Default)]
pub struct Store {
    rooms: Vec<StoredRoom>,
    last_id: i64,
}

impl Store {
    pub fn active(&self) -> Vec<Room> {
        self.partition(false)
    }

    pub fn deleted(&self) -> Vec<Room> {
        self.partition(true)
    }

    fn partition(&self, deleted: bool) -> Vec<Room> {
        self.rooms
            .iter()
            .filter(|r| r.deleted == deleted)
            .map(|r| r.room.clone())
            .collect()
    }

    fn find(&mut self, id: i64) -> Option<&mut StoredRoom> {
        self.rooms.iter_mut().find(|r| r.room.id == id)
    }

    /// Insert when `RoomID` is absent, otherwise update an active room.
    pub fn upsert(&mut self, input: SaveRoom) -> Summary {
        let alias = input.alias.filter(|s| !s.trim().is_empty());
        let name = input.name.filter(|s| !s.trim().is_empty());
        let (Some(alias), Some(name), Some(room_type_id), Some(floor_id)) =
            (alias, name, input.room_type_id, input.floor_id)
        else {
            return Summary::rejected("RoomAlise, RoomName, RoomTypeId and RFloorId are required");
        };
        let display_index = input.display_index.unwrap_or(0);
        let description = input.description.unwrap_or_default();

        match input.id {
            Some(id) => match self.find(id) {
                Some(stored) if !stored.deleted => {
                    stored.room = Room {
                        id,
                        alias,
                        name,
                        room_type_id,
                        floor_id,
                        display_index,
                        description,
                    };
                    Summary::ok("Room updated", id)
                }
                _ => Summary::rejected("Room not found"),
            },
            None => {
                self.last_id += 1;
                let id = self.last_id;
                self.rooms.push(StoredRoom {
                    room: Room {
                        id,
                        alias,
                        name,
                        room_type_id,
                        floor_id,
                        display_index,
                        description,
                    },
                    deleted: false,
                });
                Summary::ok("Room saved", id)
            }
        }
    }

    pub fn soft_delete(&mut self, id: Option<i64>) -> Summary {
        match id.and_then(|id| self.find(id)) {
            None => Summary::rejected("Room not found"),
            Some(stored) if stored.deleted => Summary::rejected("Room is already deleted"),
            Some(stored) => {
                stored.deleted = true;
                Summary::ok("Room deleted", stored.room.id)
            }
        }
    }

    pub fn restore(&mut self, id: Option<i64>) -> Summary {
        match id.and_then(|id| self.find(id)) {
            None => Summary::rejected("Room not found"),
            Some(stored) if !stored.deleted => Summary::rejected("Room is not deleted"),
            Some(stored) => {
                stored.deleted = false;
                Summary::ok("Room restored", stored.room.id)
            }
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    router(Db::default())
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/get_room_list_demo.php", post(list_rooms))
        .route("/get_room_list_deleted_demo.php", post(list_deleted_rooms))
        .route("/save_room_demo.php", post(save_room))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_rooms(State(db): State<Db>) -> Json<Value> {
    let rooms = db.read().await.active();
    Json(json!({ "result": { "rooms": rooms } }))
}

async fn list_deleted_rooms(State(db): State<Db>) -> Json<Value> {
    let rooms = db.read().await.deleted();
    Json(json!({ "result": { "deleted_rooms": rooms } }))
}

/// Failures are reported in-band with `Success: false`, always under 200.
async fn save_room(State(db): State<Db>, Json(input): Json<SaveRoom>) -> Json<Value> {
    let flag = input.action_flag;
    let mut store = db.write().await;
    let summary = match flag {
        Some(1) => store.upsert(input),
        Some(3) => store.soft_delete(input.id),
        Some(4) => store.restore(input.id),
        _ => Summary::rejected("Unknown action"),
    };
    tracing::info!(?flag, success = summary.success, message = %summary.message, "save_room");
    Json(json!({ "result": [summary] }))
}
