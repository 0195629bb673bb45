//! Refresh protocol and concurrency behavior of `LifecycleController`,
//! driven by a scripted in-memory transport.
//!
//! # Design
//! Each scripted step answers the next request in issue order and may yield
//! to the executor a number of times first, so `tokio::join!` can make an
//! earlier request complete after a later one on a single thread.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use rooms_core::{
    ApiError, ClientConfig, HttpRequest, HttpResponse, LifecycleController, ListState, Partition,
    Phase, RoomClient, RoomDraft, RoomError, RoomId, RoomService, Transport, ValidationError,
};
use serde_json::Value;

struct Step {
    yields: usize,
    /// `None` never answers.
    reply: Option<Result<String, String>>,
}

#[derive(Default)]
struct Scripted {
    steps: RefCell<VecDeque<Step>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl Scripted {
    fn reply(self, body: &str) -> Self {
        self.reply_after(0, body)
    }

    fn reply_after(self, yields: usize, body: &str) -> Self {
        self.steps.borrow_mut().push_back(Step {
            yields,
            reply: Some(Ok(body.to_string())),
        });
        self
    }

    fn fail(self) -> Self {
        self.steps.borrow_mut().push_back(Step {
            yields: 0,
            reply: Some(Err("connection refused".to_string())),
        });
        self
    }

    fn hang(self) -> Self {
        self.steps.borrow_mut().push_back(Step { yields: 0, reply: None });
        self
    }
}

impl Transport for Scripted {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let step = self.steps.borrow_mut().pop_front().expect("unscripted request");
        self.sent.borrow_mut().push(request);
        for _ in 0..step.yields {
            tokio::task::yield_now().await;
        }
        match step.reply {
            Some(reply) => reply.map(HttpResponse::ok).map_err(ApiError::Transport),
            None => std::future::pending().await,
        }
    }
}

fn controller(script: Scripted) -> LifecycleController<Scripted> {
    LifecycleController::new(RoomService::new(
        RoomClient::new(ClientConfig::new("http://svc")),
        script,
    ))
}

fn sent(c: &LifecycleController<Scripted>) -> Vec<HttpRequest> {
    c.service().transport().sent.borrow().clone()
}

fn body(req: &HttpRequest) -> Value {
    serde_json::from_str(&req.body).unwrap()
}

fn list_requests(c: &LifecycleController<Scripted>, endpoint: &str) -> usize {
    sent(c).iter().filter(|r| r.url.ends_with(endpoint)).count()
}

fn rooms_body(key: &str, ids: &[i64]) -> String {
    let rooms: Vec<Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "RoomID": id,
                "RoomAlise": format!("R{id}"),
                "RoomName": format!("Room {id}"),
                "RoomTypeId": 1,
                "RFloorId": 1
            })
        })
        .collect();
    serde_json::json!({ "result": { key: rooms } }).to_string()
}

fn ids(state: &ListState) -> Vec<i64> {
    state.items.iter().map(|r| r.id.0).collect()
}

fn lobby() -> RoomDraft {
    RoomDraft {
        alias: "A1".to_string(),
        name: "Lobby".to_string(),
        room_type_id: "2".to_string(),
        floor_id: "1".to_string(),
        ..RoomDraft::default()
    }
}

const ACCEPTED: &str = r#"{"result":[{"Success":true,"Message":"ok"}]}"#;

#[tokio::test]
async fn create_coerces_fields_and_uses_upsert_flag() {
    let c = controller(Scripted::default().reply(ACCEPTED).reply(&rooms_body("rooms", &[1])));
    c.create_or_update(&lobby()).await.unwrap();

    let sent = sent(&c);
    let payload = body(&sent[0]);
    assert!(payload.get("RoomID").is_none());
    assert_eq!(payload["RoomTypeId"], 2);
    assert_eq!(payload["RFloorId"], 1);
    assert_eq!(payload["DisplayIndex"], 0);
    assert_eq!(payload["action_flag"], 1);
    assert_eq!(ids(&c.active().state()), vec![1]);
}

#[tokio::test]
async fn every_missing_required_field_sends_nothing() {
    let drafts = [
        RoomDraft { alias: String::new(), ..lobby() },
        RoomDraft { name: String::new(), ..lobby() },
        RoomDraft { room_type_id: String::new(), ..lobby() },
        RoomDraft { floor_id: String::new(), ..lobby() },
    ];
    for draft in drafts {
        let c = controller(Scripted::default());
        let err = c.create_or_update(&draft).await.unwrap_err();
        assert!(matches!(err, RoomError::Validation(_)));
        assert!(sent(&c).is_empty());
    }
}

#[tokio::test]
async fn rejected_soft_delete_surfaces_message_and_keeps_items() {
    let c = controller(
        Scripted::default()
            .reply(&rooms_body("rooms", &[42, 43]))
            .reply(r#"{"result":[{"Success":false,"Message":"locked"}]}"#),
    );
    c.load(Partition::Active).await;
    let before = c.active().state();

    let err = c.soft_delete(RoomId(42)).await.unwrap_err();
    assert_eq!(err.user_message(), "locked");
    assert_eq!(c.last_error().as_deref(), Some("locked"));
    assert_eq!(c.phase(), Phase::Failed);
    assert_eq!(c.active().state(), before);
    assert_eq!(list_requests(&c, "get_room_list_demo.php"), 1);
    assert_eq!(body(&sent(&c)[1]), serde_json::json!({"RoomID": 42, "action_flag": 3}));
}

#[tokio::test]
async fn deleted_list_without_collection_is_empty() {
    let c = controller(Scripted::default().reply(r#"{"result":{}}"#));
    c.load(Partition::Deleted).await;
    let state = c.deleted().state();
    assert!(state.items.is_empty());
    assert!(state.error.is_none());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn restore_refreshes_deleted_only() {
    let c = controller(
        Scripted::default()
            .reply(&rooms_body("rooms", &[1]))
            .reply(&rooms_body("deleted_rooms", &[7, 8]))
            .reply(ACCEPTED)
            .reply(&rooms_body("deleted_rooms", &[8])),
    );
    c.load(Partition::Active).await;
    c.load(Partition::Deleted).await;
    let active_before = c.active().state();

    c.restore(RoomId(7)).await.unwrap();
    assert_eq!(ids(&c.deleted().state()), vec![8]);
    assert_eq!(c.active().state(), active_before);
    assert_eq!(list_requests(&c, "get_room_list_deleted_demo.php"), 2);
    assert_eq!(list_requests(&c, "get_room_list_demo.php"), 1);
}

#[tokio::test]
async fn refresh_runs_once_per_successful_mutation_and_never_on_failure() {
    let c = controller(
        Scripted::default()
            // create: accepted
            .reply(ACCEPTED)
            .reply(&rooms_body("rooms", &[1]))
            // update: rejected
            .reply(r#"{"result":[{"Success":false}]}"#)
            // soft-delete: transport failure
            .fail()
            // soft-delete: empty result counts as success
            .reply(r#"{"result":[]}"#)
            .reply(&rooms_body("rooms", &[])),
    );

    c.create_or_update(&lobby()).await.unwrap();
    assert_eq!(list_requests(&c, "get_room_list_demo.php"), 1);

    let edit = RoomDraft { id: Some(RoomId(1)), ..lobby() };
    let err = c.create_or_update(&edit).await.unwrap_err();
    assert_eq!(err.user_message(), "Save failed");
    assert_eq!(list_requests(&c, "get_room_list_demo.php"), 1);
    assert_eq!(ids(&c.active().state()), vec![1]);

    let err = c.soft_delete(RoomId(1)).await.unwrap_err();
    assert_eq!(err.user_message(), "Network error");
    assert_eq!(list_requests(&c, "get_room_list_demo.php"), 1);

    c.soft_delete(RoomId(1)).await.unwrap();
    assert_eq!(list_requests(&c, "get_room_list_demo.php"), 2);
    assert!(c.active().items().is_empty());
    assert_eq!(c.phase(), Phase::Idle);
    assert!(c.deleted().items().is_empty(), "deleted list untouched");
}

#[tokio::test]
async fn list_active_twice_without_mutation_is_stable() {
    let body = rooms_body("rooms", &[3, 1, 2]);
    let c = controller(Scripted::default().reply(&body).reply(&body));
    c.load(Partition::Active).await;
    let first = c.active().state();
    c.refresh(Partition::Active).await;
    let second = c.active().state();
    assert_eq!(first, second);
    assert_eq!(ids(&second), vec![3, 1, 2]);
}

#[tokio::test]
async fn late_completion_of_older_fetch_is_discarded() {
    // The first request issued is slow, the second fast.
    let c = controller(
        Scripted::default()
            .reply_after(5, &rooms_body("rooms", &[1]))
            .reply_after(1, &rooms_body("rooms", &[2])),
    );
    tokio::join!(c.refresh(Partition::Active), c.refresh(Partition::Active));

    let state = c.active().state();
    assert_eq!(ids(&state), vec![2]);
    assert!(!state.is_refreshing);
}

#[tokio::test]
async fn in_order_completions_leave_newest_result() {
    let c = controller(
        Scripted::default()
            .reply_after(1, &rooms_body("rooms", &[1]))
            .reply_after(5, &rooms_body("rooms", &[2])),
    );
    tokio::join!(c.load(Partition::Active), c.load(Partition::Active));

    let state = c.active().state();
    assert_eq!(ids(&state), vec![2]);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn second_intent_while_submitting_is_refused() {
    let c = controller(
        Scripted::default()
            .reply_after(3, ACCEPTED)
            .reply(&rooms_body("rooms", &[1])),
    );
    let draft = lobby();
    let (a, b) = tokio::join!(c.create_or_update(&draft), c.soft_delete(RoomId(1)));

    let busy = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(RoomError::Busy)))
        .count();
    assert_eq!(busy, 1, "exactly one intent refused: {a:?} {b:?}");
    assert!(a.is_ok() || b.is_ok());
    assert_eq!(sent(&c).len(), 2);
    assert_eq!(c.phase(), Phase::Idle);
}

#[tokio::test]
async fn abandoned_intent_does_not_lock_out_the_next_one() {
    let c = controller(
        Scripted::default()
            .hang()
            .reply(ACCEPTED)
            .reply(&rooms_body("deleted_rooms", &[])),
    );
    let abandoned = tokio::time::timeout(Duration::from_millis(20), c.restore(RoomId(7))).await;
    assert!(abandoned.is_err(), "first restore never answers");
    assert_eq!(c.phase(), Phase::Idle);

    c.restore(RoomId(7)).await.unwrap();
    assert_eq!(c.phase(), Phase::Idle);
    assert_eq!(sent(&c).len(), 3);
}

#[tokio::test]
async fn failed_refresh_after_accepted_mutation_still_succeeds() {
    let c = controller(
        Scripted::default()
            .reply(&rooms_body("rooms", &[1]))
            .reply(ACCEPTED)
            .fail(),
    );
    c.load(Partition::Active).await;

    c.soft_delete(RoomId(1)).await.unwrap();
    assert_eq!(c.phase(), Phase::Idle);
    assert!(c.last_error().is_none());
    let state = c.active().state();
    assert_eq!(state.error.as_deref(), Some("Network error"));
    assert_eq!(ids(&state), vec![1], "failed refresh keeps the previous items");
    assert!(!state.is_refreshing);
}

#[tokio::test]
async fn failed_validation_then_retry_succeeds() {
    let c = controller(Scripted::default().reply(ACCEPTED).reply(&rooms_body("rooms", &[1])));
    let err = c
        .create_or_update(&RoomDraft { name: " ".to_string(), ..lobby() })
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::Validation(ValidationError::MissingName)));
    assert_eq!(c.phase(), Phase::Failed);

    c.create_or_update(&lobby()).await.unwrap();
    assert_eq!(c.phase(), Phase::Idle);
    assert!(c.last_error().is_none());
}
