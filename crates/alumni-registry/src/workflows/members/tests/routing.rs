use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Router};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::approval::{SharedIdentity, StaticTokenIdentity};
use crate::workflows::fixtures::{admin_actor, read_json_body, registry, Registry, ADMIN_TOKEN};
use crate::workflows::members::member_router;
use crate::workflows::membership::MembershipType;

fn app(registry: &Registry) -> Router {
    let identity: SharedIdentity =
        Arc::new(StaticTokenIdentity::new().with_token(ADMIN_TOKEN, admin_actor()));
    member_router(registry.directory.clone()).layer(Extension(identity))
}

fn admin_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn member_info_is_public() {
    let registry = registry();
    stored_member(&registry, "Rahim Uddin", "G-2012-0001", MembershipType::General, None);

    let response = app(&registry)
        .oneshot(
            Request::get("/api/member-info/G-2012-0001")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["member_id"], "G-2012-0001");
    assert_eq!(payload["name"], "Rahim Uddin");
    assert_eq!(payload["address"], "");
}

#[tokio::test]
async fn unknown_member_info_is_not_found() {
    let registry = registry();
    let response = app(&registry)
        .oneshot(
            Request::get("/api/member-info/G-1900-0001")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json_body(response).await["message"], "Member not found.");
}

#[tokio::test]
async fn renew_route_rejects_lifetime_members() {
    let registry = registry();
    let member = stored_member(&registry, "Lifetime", "LT-2000-0096", MembershipType::Lifetime, None);

    let response = app(&registry)
        .oneshot(admin_post(
            &format!("/api/members/{}/renew-membership", member.id),
            r#"{"years": 1}"#,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        read_json_body(response).await["message"],
        "Lifetime membership does not expire and cannot be renewed."
    );
}

#[tokio::test]
async fn resend_route_confirms_delivery() {
    let registry = registry();
    let member = stored_member(&registry, "Rahim", "G-2012-0001", MembershipType::General, None);

    let response = app(&registry)
        .oneshot(admin_post(&format!("/api/members/{}/resend-sms", member.id), "{}"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await["message"], "SMS sent successfully.");
    assert_eq!(registry.notifier.sms().len(), 1);
}

#[tokio::test]
async fn disable_route_returns_member_without_password_hash() {
    let registry = registry();
    let member = stored_member(&registry, "Rahim", "G-2012-0001", MembershipType::General, None);

    let response = app(&registry)
        .oneshot(admin_post(&format!("/api/members/{}/disable", member.id), ""))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload["data"]["disabled_at"].is_string());
    assert!(payload["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn member_list_is_forbidden_without_admin_token() {
    let registry = registry();
    let response = app(&registry)
        .oneshot(
            Request::get("/api/members")
                .header(header::AUTHORIZATION, "Bearer unknown")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
