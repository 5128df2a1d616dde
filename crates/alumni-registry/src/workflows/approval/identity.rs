use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::workflows::error::ServiceError;

/// Identifier of the user account acting on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Member,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Member => "member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// Resolves bearer tokens to actors. Token issuance lives elsewhere.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, token: &str) -> Option<Actor>;
}

/// Shared handle installed as a request extension for [`Caller`].
pub type SharedIdentity = Arc<dyn IdentityProvider>;

/// Fixed token table, filled at startup or by tests.
#[derive(Default)]
pub struct StaticTokenIdentity {
    tokens: RwLock<HashMap<String, Actor>>,
}

impl StaticTokenIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, token: impl Into<String>, actor: Actor) -> Self {
        self.register(token, actor);
        self
    }

    pub fn register(&self, token: impl Into<String>, actor: Actor) {
        self.tokens
            .write()
            .expect("identity lock poisoned")
            .insert(token.into(), actor);
    }
}

impl IdentityProvider for StaticTokenIdentity {
    fn resolve(&self, token: &str) -> Option<Actor> {
        self.tokens
            .read()
            .expect("identity lock poisoned")
            .get(token)
            .cloned()
    }
}

/// The actor behind a request, if any token resolved.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Actor>);

impl Caller {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn acting_as(actor: Actor) -> Self {
        Self(Some(actor))
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = match (bearer_token(parts), parts.extensions.get::<SharedIdentity>()) {
            (Some(token), Some(identity)) => identity.resolve(token),
            _ => None,
        };
        Ok(Caller(actor))
    }
}

pub fn require_authenticated(caller: &Caller) -> Result<&Actor, ServiceError> {
    caller.actor().ok_or(ServiceError::Unauthenticated)
}

pub fn require_super_admin(caller: &Caller) -> Result<&Actor, ServiceError> {
    let actor = require_authenticated(caller)?;
    if actor.is_super_admin() {
        Ok(actor)
    } else {
        Err(ServiceError::Forbidden)
    }
}
