//! Seeded reference data: secondary member types (committee roles) and the
//! scholarship programmes applicants can choose from.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::approval::{Caller, Record, RecordId, RecordStore, RepositoryError};
use super::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberType {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl Record for MemberType {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_active: bool,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
}

impl Record for Scholarship {
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

pub const COMMITTEE_ROLES: [&str; 32] = [
    "President",
    "Senior Vice President",
    "Vice President",
    "Secretary General",
    "Senior Joint Secretary General",
    "Joint Secretary General",
    "Treasurer",
    "Co-Treasurer",
    "Organising Secretary",
    "Office Secretary",
    "Cultural & Publication Secretary",
    "Publicity, Information & Communication Secretary",
    "Education, Technology & Research Secretary",
    "Sports Secretary",
    "Social Welfare Secretary",
    "Legal Affairs Secretary",
    "International Affairs Secretary",
    "Women Affairs Secretary",
    "Health &Treatment Affairs Secretary",
    "Career & Employment Affairs Secretary",
    "Associate Organising Secretary",
    "Associate Office Secretary",
    "Associate Cultural & Publication Secretary",
    "Associate Publicity, Information & Communication Secretary",
    "Associate Education, Technology & Research Secretary",
    "Associate Sports Secretary",
    "Associate Social Welfare Secretary",
    "Associate Legal Affairs Secretary",
    "Associate International Affairs Secretary",
    "Associate Women Affairs Secretary",
    "Associate Health & Treatment Affairs Secretary",
    "Associate Career & Employment Affairs Secretary",
];

/// Title, description and category of each seeded programme, in display order.
const SCHOLARSHIP_PROGRAMMES: [(&str, &str, &str); 4] = [
    (
        "Scholarships for Students (Classes 6–9, SSC)",
        "Scholarship for current students of Jahapur Secondary School from classes VI to IX and SSC level.",
        "Students (Classes 6–9, SSC)",
    ),
    (
        "JSSAA Scholarships (Upazila/Zila level)",
        "Scholarship for current students of other schools (Inter Union, Upazilla & Zilla) from classes VI to X.",
        "Upazila/Zila level",
    ),
    (
        "JSSAA Scholarships for Ex-Students",
        "Scholarship support for ex-students of Jahapur Secondary School who are currently pursuing further education.",
        "Ex-Students",
    ),
    (
        "JSSAA Scholarships for Ex-Students' Children",
        "Educational support for children of registered alumni members of Jahapur Secondary School.",
        "Ex-Students' Children",
    ),
];

/// Inserts every committee role that is not stored yet.
pub fn seed_member_types(
    store: &dyn RecordStore<MemberType>,
    now: DateTime<Utc>,
) -> Result<usize, RepositoryError> {
    let mut inserted = 0;
    for name in COMMITTEE_ROLES {
        let record = MemberType {
            id: RecordId::default(),
            name: name.to_string(),
            description: None,
            created_at: now,
        };
        match store.insert(record) {
            Ok(_) => inserted += 1,
            Err(RepositoryError::Conflict) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(inserted)
}

pub fn seed_scholarships(
    store: &dyn RecordStore<Scholarship>,
    now: DateTime<Utc>,
) -> Result<usize, RepositoryError> {
    let existing = store.select(&|_| true)?;
    let mut inserted = 0;
    for (position, (title, description, category)) in SCHOLARSHIP_PROGRAMMES.iter().enumerate() {
        if existing.iter().any(|scholarship| scholarship.title == *title) {
            continue;
        }
        store.insert(Scholarship {
            id: RecordId::default(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            is_active: true,
            sort_order: position as u32 + 1,
            created_at: now,
        })?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Read access to the reference data used by declarations and scholarship intake.
pub struct CatalogService {
    member_types: Arc<dyn RecordStore<MemberType>>,
    scholarships: Arc<dyn RecordStore<Scholarship>>,
}

impl CatalogService {
    pub fn new(
        member_types: Arc<dyn RecordStore<MemberType>>,
        scholarships: Arc<dyn RecordStore<Scholarship>>,
    ) -> Self {
        Self {
            member_types,
            scholarships,
        }
    }

    /// All member types ordered by name.
    pub fn member_types(&self) -> Result<Vec<MemberType>, ServiceError> {
        let mut types = self.member_types.select(&|_| true)?;
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    pub fn member_type(&self, id: RecordId) -> Result<Option<MemberType>, ServiceError> {
        Ok(self.member_types.fetch(id)?)
    }

    /// Active programmes for the public; admins see all, optionally filtered.
    pub fn scholarships(
        &self,
        caller: &Caller,
        is_active: Option<bool>,
    ) -> Result<Vec<Scholarship>, ServiceError> {
        let is_admin = caller.actor().is_some_and(|actor| actor.is_super_admin());
        let wanted = if is_admin { is_active } else { Some(true) };
        let mut scholarships = self
            .scholarships
            .select(&|scholarship| wanted.map_or(true, |active| scholarship.is_active == active))?;
        scholarships.sort_by_key(|scholarship| (scholarship.sort_order, scholarship.id));
        Ok(scholarships)
    }

    pub fn scholarship(&self, id: RecordId) -> Result<Option<Scholarship>, ServiceError> {
        Ok(self.scholarships.fetch(id)?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ScholarshipQuery {
    #[serde(default)]
    pub is_active: Option<bool>,
}

pub fn catalog_router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/api/member-types", get(member_types_handler))
        .route("/api/scholarships", get(scholarships_handler))
        .with_state(service)
}

pub(crate) async fn member_types_handler(State(service): State<Arc<CatalogService>>) -> Response {
    match service.member_types() {
        Ok(types) => Json(json!({ "data": types })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn scholarships_handler(
    State(service): State<Arc<CatalogService>>,
    caller: Caller,
    Query(query): Query<ScholarshipQuery>,
) -> Response {
    match service.scholarships(&caller, query.is_active) {
        Ok(scholarships) => Json(json!({ "data": scholarships })).into_response(),
        Err(err) => err.into_response(),
    }
}
