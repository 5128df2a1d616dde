use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::account::{AccountSummary, MemberInfo, MemberProfile, MemberView, UserAccount};
use super::credentials::PasswordIssuer;
use super::expiry::{add_years, compute_expiry, renewal_base};
use super::member_id::allocate;
use super::messages::{approval_sms_body, credentials_notification};
use crate::outbound::{deliver, Notification, Notifier, SmsMessage};
use crate::workflows::approval::{
    require_super_admin, Actor, ApprovalStatus, ApprovalStore, Caller, ListQuery, Page, RecordId,
    RecordStore, Role, SideEffect,
};
use crate::workflows::error::ServiceError;
use crate::workflows::membership::{MembershipApplication, MembershipType};
use crate::workflows::validation::{present, Scalar, ValidationErrors};

pub const MEMBER_NOT_FOUND: &str = "Member not found.";
pub const LIFETIME_NOT_RENEWABLE: &str =
    "Lifetime membership does not expire and cannot be renewed.";
pub const MISSING_PHONE: &str = "User does not have a phone number.";

/// Account created for an approved membership application.
#[derive(Debug, Clone, PartialEq)]
pub struct Provisioned {
    pub account: UserAccount,
    pub effect: SideEffect,
}

impl Provisioned {
    pub fn summary(&self) -> AccountSummary {
        AccountSummary::from(&self.account)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub primary_member_type: Option<MembershipType>,
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
}

impl MemberQuery {
    fn matches(&self, account: &UserAccount) -> bool {
        if let Some(wanted) = self.primary_member_type {
            if account.primary_member_type != Some(wanted) {
                return false;
            }
        }
        let Some(needle) = present(self.search.as_deref()) else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            Some(account.name.as_str()),
            account.email.as_deref(),
            account.member_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    fn pagination(&self) -> ListQuery {
        ListQuery {
            status: None,
            per_page: self.per_page,
            page: self.page,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenewRequest {
    #[serde(default)]
    pub years: Option<Scalar>,
}

/// Outcome of the expiry backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub updated: usize,
    pub no_approved_application: usize,
    pub could_not_compute: usize,
}

impl BackfillReport {
    pub fn summary(&self) -> String {
        format!(
            "Backfilled membership_expires_at for {} member(s). Skipped: {} no approved application, {} could not compute.",
            self.updated, self.no_approved_application, self.could_not_compute
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProfileMigrationReport {
    pub created: usize,
    pub already_present: usize,
    pub no_approved_application: usize,
}

impl ProfileMigrationReport {
    pub fn summary(&self) -> String {
        format!(
            "Created {} member profile(s). Skipped: {} already present, {} no approved application.",
            self.created, self.already_present, self.no_approved_application
        )
    }
}

/// Member accounts: provisioning on approval, administration, and lookups.
pub struct MemberDirectory {
    users: Arc<dyn RecordStore<UserAccount>>,
    profiles: Arc<dyn RecordStore<MemberProfile>>,
    applications: Arc<dyn ApprovalStore<MembershipApplication>>,
    notifier: Arc<dyn Notifier>,
    passwords: PasswordIssuer,
    frontend_url: String,
    allocation: Mutex<()>,
}

impl MemberDirectory {
    pub fn new(
        users: Arc<dyn RecordStore<UserAccount>>,
        profiles: Arc<dyn RecordStore<MemberProfile>>,
        applications: Arc<dyn ApprovalStore<MembershipApplication>>,
        notifier: Arc<dyn Notifier>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            profiles,
            applications,
            notifier,
            passwords: PasswordIssuer::default(),
            frontend_url: frontend_url.into(),
            allocation: Mutex::new(()),
        }
    }

    pub fn with_password_issuer(mut self, passwords: PasswordIssuer) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn passwords(&self) -> &PasswordIssuer {
        &self.passwords
    }

    /// Creates the account and profile for an approved application and sends
    /// the credentials. Member IDs are allocated one at a time.
    pub fn provision(
        &self,
        application: &MembershipApplication,
        now: DateTime<Utc>,
    ) -> Result<Provisioned, ServiceError> {
        let issued = self.passwords.issue()?;
        let expires_at = if application.membership_type.expires() {
            let years = application.payment_years.years().map_or(0, i64::from);
            compute_expiry(application.approval.approved_at, years)
        } else {
            None
        };

        let account = {
            let _guard = self.allocation.lock().expect("allocation mutex poisoned");
            let issued_ids = self.users.select(&|user| user.member_id.is_some())?;
            let member_id = allocate(
                application.membership_type,
                application.ssc_year,
                application.jsc_year,
                issued_ids.iter().filter_map(|user| user.member_id.as_deref()),
            )
            .map_err(|err| ServiceError::rule(err.to_string()))?;

            self.users.insert(UserAccount {
                id: RecordId::default(),
                name: application.full_name.clone(),
                email: application.email.clone(),
                phone: Some(application.mobile_number.clone()),
                password_hash: issued.hash,
                role: Role::Member,
                primary_member_type: Some(application.membership_type),
                secondary_member_type_id: None,
                member_id: Some(member_id),
                membership_expires_at: expires_at,
                membership_renewed_at: None,
                disabled_at: None,
                created_at: now,
            })?
        };

        self.profiles
            .insert(MemberProfile::from_application(account.id, application, now))?;

        let member_id = account.member_id.clone().unwrap_or_default();
        info!(user_id = %account.id, %member_id, "member account provisioned");

        match credentials_notification(
            account.email.as_deref(),
            account.phone.as_deref(),
            &account.name,
            &member_id,
            &issued.plain,
            &self.frontend_url,
        ) {
            Some(notification) => {
                deliver(self.notifier.as_ref(), notification);
            }
            None => warn!(user_id = %account.id, "no contact channel for member credentials"),
        }

        Ok(Provisioned {
            effect: SideEffect::MemberProvisioned {
                user_id: account.id.0,
                member_id,
                membership_expires_at: expires_at,
            },
            account,
        })
    }

    pub fn account(&self, id: RecordId) -> Result<Option<UserAccount>, ServiceError> {
        Ok(self.users.fetch(id)?)
    }

    /// Account backing an authenticated actor.
    pub fn account_for(&self, actor: &Actor) -> Result<Option<UserAccount>, ServiceError> {
        self.account(RecordId(actor.id.0))
    }

    pub fn save(&self, account: UserAccount) -> Result<(), ServiceError> {
        Ok(self.users.update(account)?)
    }

    pub fn member_id_exists(&self, member_id: &str) -> Result<bool, ServiceError> {
        Ok(!self
            .users
            .select(&|user| user.member_id.as_deref() == Some(member_id))?
            .is_empty())
    }

    /// Latest approved application matching the account's email, or its phone
    /// when it has no email.
    pub fn approved_application(
        &self,
        account: &UserAccount,
    ) -> Result<Option<MembershipApplication>, ServiceError> {
        let email = present(account.email.as_deref());
        let phone = present(account.phone.as_deref());
        if email.is_none() && phone.is_none() {
            return Ok(None);
        }
        let mut matches = self.applications.select(&|application| {
            application.approval.status == ApprovalStatus::Approved
                && match (&email, &phone) {
                    (Some(email), _) => application.email.as_deref() == Some(email.as_str()),
                    (None, Some(phone)) => &application.mobile_number == phone,
                    (None, None) => false,
                }
        })?;
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }

    /// Stored expiry, falling back to the approved application. Lifetime and
    /// untyped accounts never expire.
    pub fn effective_expiry(
        &self,
        account: &UserAccount,
    ) -> Result<Option<DateTime<Utc>>, ServiceError> {
        match account.primary_member_type {
            None | Some(MembershipType::Lifetime) => return Ok(None),
            Some(_) => {}
        }
        if account.membership_expires_at.is_some() {
            return Ok(account.membership_expires_at);
        }
        Ok(self.approved_application(account)?.and_then(|application| {
            let years = application.payment_years.years().map_or(0, i64::from);
            compute_expiry(application.approval.approved_at, years)
        }))
    }

    fn view_of(&self, account: UserAccount) -> Result<MemberView, ServiceError> {
        let effective_membership_expires_at = self.effective_expiry(&account)?;
        let profile = self
            .profiles
            .select(&|profile| profile.user_id == account.id)?
            .into_iter()
            .next();
        Ok(MemberView {
            account,
            effective_membership_expires_at,
            profile,
        })
    }

    fn member(&self, user_id: RecordId) -> Result<UserAccount, ServiceError> {
        self.users
            .fetch(user_id)?
            .filter(UserAccount::is_member)
            .ok_or(ServiceError::NotFound(MEMBER_NOT_FOUND))
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &MemberQuery,
    ) -> Result<Page<MemberView>, ServiceError> {
        require_super_admin(caller)?;
        let members = self
            .users
            .select(&|user| user.is_member() && query.matches(user))?;
        let page = query.pagination().paginate(members);
        let meta = page.meta;
        let data = page
            .data
            .into_iter()
            .map(|account| self.view_of(account))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page { data, meta })
    }

    pub fn show(&self, caller: &Caller, user_id: RecordId) -> Result<MemberView, ServiceError> {
        require_super_admin(caller)?;
        let account = self.member(user_id)?;
        self.view_of(account)
    }

    /// Extends a running membership from its expiry, a lapsed one from `now`.
    pub fn renew(
        &self,
        caller: &Caller,
        user_id: RecordId,
        request: &RenewRequest,
        now: DateTime<Utc>,
    ) -> Result<MemberView, ServiceError> {
        require_super_admin(caller)?;

        let mut errors = ValidationErrors::new();
        let years = match request.years.as_ref().filter(|years| !years.is_blank()) {
            None => {
                errors.required("years", None);
                None
            }
            Some(raw) => errors
                .integer("years", Some(raw))
                .filter(|years| errors.between("years", *years, 1, 10)),
        };
        errors.finish()?;

        let mut account = self.member(user_id)?;
        if account.is_lifetime() {
            return Err(ServiceError::rule(LIFETIME_NOT_RENEWABLE));
        }
        let years = years.and_then(|years| u32::try_from(years).ok()).unwrap_or(1);
        let base = renewal_base(self.effective_expiry(&account)?, now);
        let expires_at = add_years(base, years)
            .ok_or_else(|| ServiceError::rule("Membership expiry is out of range."))?;

        account.membership_expires_at = Some(expires_at);
        account.membership_renewed_at = Some(now);
        self.users.update(account.clone())?;
        info!(user_id = %account.id, %expires_at, years, "membership renewed");
        self.view_of(account)
    }

    /// Rotates the password and sends the approval SMS again.
    pub fn resend_credentials(
        &self,
        caller: &Caller,
        user_id: RecordId,
    ) -> Result<(), ServiceError> {
        require_super_admin(caller)?;
        let mut account = self
            .users
            .fetch(user_id)?
            .ok_or(ServiceError::NotFound(MEMBER_NOT_FOUND))?;
        let Some(phone) = present(account.phone.as_deref()) else {
            return Err(ServiceError::rule(MISSING_PHONE));
        };

        let issued = self.passwords.issue()?;
        account.password_hash = issued.hash;
        self.users.update(account.clone())?;

        let body = approval_sms_body(
            account.member_id.as_deref().unwrap_or_default(),
            &issued.plain,
            &self.frontend_url,
        );
        deliver(
            self.notifier.as_ref(),
            Notification::Sms(SmsMessage { to: phone, body }),
        );
        info!(user_id = %account.id, "member credentials reissued");
        Ok(())
    }

    pub fn set_disabled(
        &self,
        caller: &Caller,
        user_id: RecordId,
        disabled: bool,
        now: DateTime<Utc>,
    ) -> Result<MemberView, ServiceError> {
        require_super_admin(caller)?;
        let mut account = self.member(user_id)?;
        account.disabled_at = disabled.then_some(now);
        self.users.update(account.clone())?;
        info!(user_id = %account.id, disabled, "member access changed");
        self.view_of(account)
    }

    /// Public lookup for payment forms: name, address and mobile by member ID.
    pub fn member_info(&self, member_id: &str) -> Result<MemberInfo, ServiceError> {
        let account = self
            .users
            .select(&|user| user.is_member() && user.member_id.as_deref() == Some(member_id))?
            .into_iter()
            .next()
            .ok_or(ServiceError::NotFound(MEMBER_NOT_FOUND))?;
        let application = self.approved_application(&account)?;

        Ok(MemberInfo {
            member_id: member_id.to_string(),
            name: account.name.clone(),
            address: application
                .as_ref()
                .map(|application| application.present_address.clone())
                .unwrap_or_default(),
            mobile_number: application
                .map(|application| application.mobile_number)
                .or(account.phone)
                .unwrap_or_default(),
        })
    }

    /// Stores the derived expiry on GENERAL and ASSOCIATE members that have none.
    pub fn backfill_expiry(&self) -> Result<BackfillReport, ServiceError> {
        let candidates = self.users.select(&|user| {
            user.is_member()
                && user.membership_expires_at.is_none()
                && matches!(
                    user.primary_member_type,
                    Some(MembershipType::General | MembershipType::Associate)
                )
        })?;

        let mut report = BackfillReport::default();
        for mut account in candidates {
            let Some(application) = self.approved_application(&account)? else {
                report.no_approved_application += 1;
                continue;
            };
            let years = application.payment_years.years().map_or(0, i64::from);
            match compute_expiry(application.approval.approved_at, years) {
                Some(expires_at) => {
                    account.membership_expires_at = Some(expires_at);
                    self.users.update(account)?;
                    report.updated += 1;
                }
                None => report.could_not_compute += 1,
            }
        }
        info!(
            updated = report.updated,
            no_application = report.no_approved_application,
            not_computed = report.could_not_compute,
            "membership expiry backfill finished"
        );
        Ok(report)
    }

    /// Creates profiles for members approved before profiles existed.
    pub fn backfill_profiles(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ProfileMigrationReport, ServiceError> {
        let members = self.users.select(&|user| user.is_member())?;
        let mut report = ProfileMigrationReport::default();
        for account in members {
            let existing = self
                .profiles
                .select(&|profile| profile.user_id == account.id)?;
            if !existing.is_empty() {
                report.already_present += 1;
                continue;
            }
            match self.approved_application(&account)? {
                Some(application) => {
                    self.profiles
                        .insert(MemberProfile::from_application(account.id, &application, now))?;
                    report.created += 1;
                }
                None => report.no_approved_application += 1,
            }
        }
        info!(created = report.created, "member profile migration finished");
        Ok(report)
    }
}
