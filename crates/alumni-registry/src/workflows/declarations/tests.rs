use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Router};
use serde_json::json;
use tower::ServiceExt;

use super::*;
use crate::workflows::approval::{
    Actor, ActorId, ApprovalStatus, Caller, ListQuery, MemoryStore, RecordId, RecordStore,
    RejectRequest, Role, SharedIdentity, SideEffect, StaticTokenIdentity,
};
use crate::workflows::error::ServiceError;
use crate::workflows::fixtures::{
    admin, admin_actor, catalog, member_account, member_caller, now, read_json_body, registry,
    Registry, ADMIN_TOKEN,
};
use crate::workflows::membership::MembershipType;
use crate::workflows::validation::Scalar;

const MEMBER_TOKEN: &str = "member-token";
const TREASURER: i64 = 7;

struct Harness {
    registry: Registry,
    declarations: Arc<MemoryStore<SelfDeclaration>>,
    service: Arc<DeclarationService>,
    member: RecordId,
}

fn harness() -> Harness {
    let registry = registry();
    let declarations = Arc::new(MemoryStore::<SelfDeclaration>::new());
    let service = Arc::new(DeclarationService::new(
        declarations.clone(),
        registry.directory.clone(),
        catalog().service,
    ));
    let member = registry
        .users
        .insert(member_account(
            "Karima Begum",
            "G-2012-0001",
            MembershipType::General,
            Some("karima@example.com"),
            None,
        ))
        .expect("member stored")
        .id;
    Harness {
        registry,
        declarations,
        service,
        member,
    }
}

fn form(member_type: i64) -> DeclarationSubmission {
    DeclarationSubmission {
        name: Some("Karima Begum".to_string()),
        signature_file: Some("self-declarations/signature_karima.png".to_string()),
        secondary_member_type_id: Some(Scalar::from(member_type)),
        date: Some("2026-01-20".to_string()),
    }
}

impl Harness {
    fn declared(&self) -> RecordId {
        self.service
            .submit(&member_caller(self.member), form(TREASURER), now())
            .expect("valid declaration")
            .declaration
            .id
    }

    fn app(&self) -> Router {
        let identity = StaticTokenIdentity::new()
            .with_token(ADMIN_TOKEN, admin_actor())
            .with_token(
                MEMBER_TOKEN,
                Actor {
                    id: ActorId(self.member.0),
                    role: Role::Member,
                },
            );
        let identity: SharedIdentity = Arc::new(identity);
        declaration_router(self.service.clone()).layer(Extension(identity))
    }
}

#[test]
fn submission_requires_a_signed_in_account() {
    let harness = harness();
    let err = harness
        .service
        .submit(&Caller::anonymous(), form(TREASURER), now())
        .expect_err("anonymous");
    assert!(matches!(err, ServiceError::Unauthenticated));
}

#[test]
fn second_pending_declaration_is_refused() {
    let harness = harness();
    let view = harness
        .service
        .submit(&member_caller(harness.member), form(TREASURER), now())
        .expect("first declaration");
    assert_eq!(
        view.secondary_member_type.map(|member_type| member_type.name),
        Some("Treasurer".to_string())
    );
    assert_eq!(view.user.map(|user| user.id), Some(harness.member));

    let err = harness
        .service
        .submit(&member_caller(harness.member), form(1), now())
        .expect_err("second pending");
    assert!(matches!(err, ServiceError::Rule(ref message) if message == ALREADY_PENDING));
    assert_eq!(harness.declarations.len(), 1);
}

#[test]
fn unknown_member_type_is_a_validation_error() {
    let harness = harness();
    let err = harness
        .service
        .submit(&member_caller(harness.member), form(999), now())
        .expect_err("unknown type");
    assert!(matches!(
        err,
        ServiceError::Validation(ref errors) if errors.has("secondary_member_type_id")
    ));
}

#[test]
fn approval_assigns_the_role_and_blocks_new_declarations() {
    let harness = harness();
    let id = harness.declared();

    let approved = harness
        .service
        .approve(&admin(), id, now())
        .expect("approved");
    assert_eq!(
        approved.effect,
        SideEffect::SecondaryTypeAssigned {
            user_id: harness.member.0,
            secondary_member_type_id: TREASURER as u64,
        }
    );
    assert_eq!(approved.declaration.declaration.approval.status, ApprovalStatus::Approved);

    let account = harness
        .registry
        .users
        .fetch(harness.member)
        .expect("fetch")
        .expect("account");
    assert_eq!(account.secondary_member_type_id, Some(RecordId(TREASURER as u64)));

    let err = harness
        .service
        .submit(&member_caller(harness.member), form(1), now())
        .expect_err("role already held");
    assert!(matches!(err, ServiceError::Rule(ref message) if message == ALREADY_ASSIGNED));
}

#[test]
fn rejection_leaves_the_account_untouched() {
    let harness = harness();
    let id = harness.declared();

    let rejected = harness
        .service
        .reject(
            &admin(),
            id,
            RejectRequest {
                rejected_reason: Some("Role is already filled".to_string()),
            },
            now(),
        )
        .expect("rejected");
    assert_eq!(
        rejected.declaration.approval.rejected_reason.as_deref(),
        Some("Role is already filled")
    );

    let account = harness
        .registry
        .users
        .fetch(harness.member)
        .expect("fetch")
        .expect("account");
    assert_eq!(account.secondary_member_type_id, None);

    // A rejected declaration no longer blocks a fresh one.
    harness
        .service
        .submit(&member_caller(harness.member), form(1), now())
        .expect("new declaration");

    let pending = harness
        .service
        .list(
            &admin(),
            &ListQuery {
                status: Some(ApprovalStatus::Pending),
                ..ListQuery::default()
            },
        )
        .expect("listing");
    assert_eq!(pending.meta.total, 1);
}

#[tokio::test]
async fn member_submits_and_admin_approves_over_http() {
    let harness = harness();
    let app = harness.app();

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/self-declarations")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {MEMBER_TOKEN}"))
                .body(Body::from(
                    json!({
                        "name": "Karima Begum",
                        "signature_file": "self-declarations/signature_karima.png",
                        "secondary_member_type_id": "7",
                        "date": "2026-01-20",
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["data"]["status"], "PENDING");
    assert_eq!(payload["data"]["date"], "2026-01-20");
    let id = payload["data"]["id"].as_u64().expect("declaration id");

    let forbidden = app
        .clone()
        .oneshot(
            Request::post(format!("/api/self-declarations/{id}/approve"))
                .header(header::AUTHORIZATION, format!("Bearer {MEMBER_TOKEN}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::post(format!("/api/self-declarations/{id}/approve"))
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["message"],
        "Self-declaration approved successfully. Secondary member type assigned."
    );
    assert_eq!(payload["self_declaration"]["status"], "APPROVED");
    assert_eq!(payload["self_declaration"]["secondary_member_type"]["name"], "Treasurer");
}

#[tokio::test]
async fn deciding_twice_answers_not_pending() {
    let harness = harness();
    let id = harness.declared();
    harness
        .service
        .approve(&admin(), id, now())
        .expect("approved");

    let response = harness
        .app()
        .oneshot(
            Request::post(format!("/api/self-declarations/{id}/reject"))
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], "Self-declaration is not pending approval.");
}
