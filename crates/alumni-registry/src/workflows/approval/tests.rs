use std::sync::Arc;
use std::thread;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde_json::json;
use tower::ServiceExt;

use super::*;
use crate::workflows::error::ServiceError;
use crate::workflows::fixtures::{admin, admin_actor, at, member_caller, now, read_json_body};

#[derive(Debug, Clone, PartialEq)]
struct Ticket {
    id: RecordId,
    approval: ApprovalState,
    created_at: DateTime<Utc>,
}

impl Record for Ticket {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Approvable for Ticket {
    const KIND: ApprovableKind = ApprovableKind::ScholarshipApplication;
    const RECORDS_REJECTION_REASON: bool = false;

    fn approval(&self) -> &ApprovalState {
        &self.approval
    }

    fn approval_mut(&mut self) -> &mut ApprovalState {
        &mut self.approval
    }
}

fn ticket(created_at: &str) -> Ticket {
    Ticket {
        id: RecordId::default(),
        approval: ApprovalState::pending(),
        created_at: at(created_at),
    }
}

fn stored_ticket() -> (Arc<MemoryStore<Ticket>>, RecordId) {
    let store = Arc::new(MemoryStore::new());
    let id = store
        .insert(ticket("2026-01-01T00:00:00Z"))
        .expect("insert")
        .id;
    (store, id)
}

/// Reports every row as pending on read, as a reader racing another
/// reviewer would see it.
struct StaleReads(Arc<MemoryStore<Ticket>>);

impl RecordStore<Ticket> for StaleReads {
    fn insert(&self, record: Ticket) -> Result<Ticket, RepositoryError> {
        self.0.insert(record)
    }

    fn update(&self, record: Ticket) -> Result<(), RepositoryError> {
        self.0.update(record)
    }

    fn fetch(&self, id: RecordId) -> Result<Option<Ticket>, RepositoryError> {
        Ok(self.0.fetch(id)?.map(|mut row| {
            row.approval = ApprovalState::pending();
            row
        }))
    }

    fn select(&self, filter: &dyn Fn(&Ticket) -> bool) -> Result<Vec<Ticket>, RepositoryError> {
        self.0.select(filter)
    }
}

impl ApprovalStore<Ticket> for StaleReads {
    fn commit_decision(&self, record: Ticket) -> Result<(), RepositoryError> {
        self.0.commit_decision(record)
    }
}

#[test]
fn transition_stamps_reviewer_and_time_together() {
    let mut record = ticket("2026-01-01T00:00:00Z");
    transition(&mut record, &Decision::Approve, &ActorId(9), now()).expect("pending record");

    assert_eq!(record.approval.status, ApprovalStatus::Approved);
    assert_eq!(record.approval.approved_by, Some(ActorId(9)));
    assert_eq!(record.approval.approved_at, Some(now()));

    let err = transition(
        &mut record,
        &Decision::Reject { reason: None },
        &ActorId(1),
        now(),
    )
    .expect_err("already decided");
    assert_eq!(
        err,
        TransitionError::NotPending {
            kind: ApprovableKind::ScholarshipApplication,
            status: ApprovalStatus::Approved,
        }
    );
    assert_eq!(record.approval.approved_by, Some(ActorId(9)));
}

#[test]
fn reason_is_dropped_where_the_record_keeps_none() {
    let mut record = ticket("2026-01-01T00:00:00Z");
    let decision = RejectRequest {
        rejected_reason: Some("duplicate".to_string()),
    }
    .into_decision();
    transition(&mut record, &decision, &ActorId(1), now()).expect("pending record");
    assert_eq!(record.approval.status, ApprovalStatus::Rejected);
    assert_eq!(record.approval.rejected_reason, None);
}

#[test]
fn blank_reject_reason_becomes_none() {
    let decision = RejectRequest {
        rejected_reason: Some("   ".to_string()),
    }
    .into_decision();
    assert_eq!(decision, Decision::Reject { reason: None });
}

#[test]
fn commit_refuses_rows_that_are_no_longer_pending() {
    let (store, id) = stored_ticket();
    let mut first = store.fetch(id).expect("fetch").expect("row");
    let mut second = first.clone();

    transition(&mut first, &Decision::Approve, &ActorId(1), now()).expect("transition");
    store.commit_decision(first).expect("first commit wins");

    transition(&mut second, &Decision::Reject { reason: None }, &ActorId(2), now())
        .expect("transition on stale copy");
    let err = store.commit_decision(second).expect_err("second commit loses");
    assert!(matches!(err, RepositoryError::StaleDecision(ApprovalStatus::Approved)));
}

#[test]
fn decide_checks_the_caller_before_the_record() {
    let (store, id) = stored_ticket();
    let workflow = ApprovalWorkflow::<Ticket>::new(store.clone());

    let err = workflow
        .decide(id, &Caller::anonymous(), Decision::Approve, now(), |_| Ok(()))
        .expect_err("anonymous");
    assert!(matches!(err, ServiceError::Unauthenticated));

    let err = workflow
        .decide(RecordId(99), &member_caller(RecordId(3)), Decision::Approve, now(), |_| Ok(()))
        .expect_err("member");
    assert!(matches!(err, ServiceError::Forbidden));

    let err = workflow
        .decide(RecordId(99), &admin(), Decision::Approve, now(), |_| Ok(()))
        .expect_err("missing");
    assert!(matches!(err, ServiceError::NotFound("Application not found.")));

    let stored = store.fetch(id).expect("fetch").expect("row");
    assert!(stored.approval.is_pending());
}

#[test]
fn failed_precheck_writes_nothing() {
    let (store, id) = stored_ticket();
    let workflow = ApprovalWorkflow::<Ticket>::new(store.clone());

    let err = workflow
        .decide(id, &admin(), Decision::Approve, now(), |_| {
            Err(ServiceError::rule("missing passing year"))
        })
        .expect_err("precheck fails");
    assert!(matches!(err, ServiceError::Rule(_)));

    let stored = store.fetch(id).expect("fetch").expect("row");
    assert_eq!(stored.approval, ApprovalState::pending());
}

#[test]
fn lost_race_is_reported_as_not_pending() {
    let (inner, id) = stored_ticket();
    let workflow = ApprovalWorkflow::<Ticket>::new(Arc::new(StaleReads(inner.clone())));
    workflow
        .decide(id, &admin(), Decision::Approve, now(), |_| Ok(()))
        .expect("first decision");

    let err = workflow
        .decide(id, &admin(), Decision::Reject { reason: None }, now(), |_| Ok(()))
        .expect_err("stale decision");
    assert!(matches!(
        err,
        ServiceError::Transition(TransitionError::NotPending {
            status: ApprovalStatus::Approved,
            ..
        })
    ));
    let stored = inner.fetch(id).expect("fetch").expect("row");
    assert_eq!(stored.approval.status, ApprovalStatus::Approved);
}

#[test]
fn concurrent_reviewers_produce_one_decision() {
    let (store, id) = stored_ticket();
    let workflow = ApprovalWorkflow::<Ticket>::new(store.clone());

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let workflow = workflow.clone();
            thread::spawn(move || {
                let decision = if n % 2 == 0 {
                    Decision::Approve
                } else {
                    Decision::Reject { reason: None }
                };
                workflow.decide(id, &admin(), decision, now(), |_| Ok(())).is_ok()
            })
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|handle| handle.join().expect("reviewer thread"))
        .filter(|won| *won)
        .count();

    assert_eq!(successes, 1);
    let stored = store.fetch(id).expect("fetch").expect("row");
    assert!(stored.approval.status.is_decided());
}

#[test]
fn select_returns_newest_first_and_pages_slice() {
    let store = MemoryStore::new();
    for created_at in [
        "2026-01-01T00:00:00Z",
        "2026-01-03T00:00:00Z",
        "2026-01-02T00:00:00Z",
    ] {
        store.insert(ticket(created_at)).expect("insert");
    }
    let rows = store.select(&|_| true).expect("select");
    let ids: Vec<u64> = rows.iter().map(|row| row.id.0).collect();
    assert_eq!(ids, [2, 3, 1]);

    let query = ListQuery {
        status: None,
        per_page: Some(2),
        page: Some(2),
    };
    let page = query.paginate(rows);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.last_page, 2);
    assert_eq!((page.meta.from, page.meta.to), (Some(3), Some(3)));
}

#[test]
fn restored_rows_keep_their_ids() {
    let mut older = ticket("2026-01-01T00:00:00Z");
    older.id = RecordId(4);
    let mut newer = ticket("2026-01-02T00:00:00Z");
    newer.id = RecordId(9);
    let store = MemoryStore::from_records([older, newer]);

    assert!(store.fetch(RecordId(4)).expect("fetch").is_some());
    let inserted = store
        .insert(ticket("2026-01-03T00:00:00Z"))
        .expect("insert");
    assert_eq!(inserted.id, RecordId(10));
}

#[test]
fn per_page_is_clamped() {
    let query = ListQuery {
        per_page: Some(0),
        ..ListQuery::default()
    };
    assert_eq!(query.per_page(), 1);
    let query = ListQuery {
        per_page: Some(50_000),
        page: Some(-4),
        ..ListQuery::default()
    };
    assert_eq!(query.per_page(), 10_000);
    assert_eq!(query.page(), 1);

    let empty = ListQuery::default().empty_page::<Ticket>();
    assert_eq!(empty.meta.last_page, 1);
    assert_eq!(empty.meta.from, None);
}

#[tokio::test]
async fn caller_resolves_bearer_tokens() {
    async fn whoami(caller: Caller) -> Json<serde_json::Value> {
        Json(json!({ "actor": caller.actor().map(|actor| actor.id.0) }))
    }

    let identity: SharedIdentity =
        Arc::new(StaticTokenIdentity::new().with_token("secret", admin_actor()));
    let app = Router::new()
        .route("/whoami", get(whoami))
        .layer(Extension(identity));

    let response = app
        .clone()
        .oneshot(
            Request::get("/whoami")
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["actor"], 1);

    for value in ["Bearer wrong", "Basic c2VjcmV0", "Bearer "] {
        let response = app
            .clone()
            .oneshot(
                Request::get("/whoami")
                    .header(header::AUTHORIZATION, value)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert!(read_json_body(response).await["actor"].is_null());
    }
}
