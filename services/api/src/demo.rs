use crate::infra::{build_registry, seed_admin, Registry, RegistryOptions, Snapshot};
use alumni_registry::config::AdminConfig;
use alumni_registry::error::AppError;
use alumni_registry::outbound::{DocumentStore, MemoryDocumentStore, RecordingNotifier};
use alumni_registry::workflows::approval::{Caller, RecordId, RejectRequest, SideEffect};
use alumni_registry::workflows::declarations::DeclarationSubmission;
use alumni_registry::workflows::members::MEMBER_NOT_FOUND;
use alumni_registry::workflows::membership::MembershipSubmission;
use alumni_registry::workflows::payments::PaymentSubmission;
use alumni_registry::workflows::scholarships::ScholarshipSubmission;
use alumni_registry::workflows::validation::Scalar;
use alumni_registry::workflows::ServiceError;
use chrono::Utc;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Portal address printed in the credential messages
    #[arg(long, default_value = "http://localhost:5173")]
    pub(crate) frontend_url: String,
    /// Print the rendered money receipt
    #[arg(long)]
    pub(crate) show_receipt: bool,
    /// Skip the scholarship and self-declaration portion of the demo
    #[arg(long)]
    pub(crate) skip_declarations: bool,
}

fn demo_membership_submission() -> MembershipSubmission {
    MembershipSubmission {
        membership_type: Some("GENERAL".to_string()),
        full_name: Some("Rahim Uddin".to_string()),
        name_bangla: Some("রহিম উদ্দিন".to_string()),
        father_name: Some("Karim Uddin".to_string()),
        gender: Some("MALE".to_string()),
        ssc_year: Some(Scalar::from(2018)),
        present_address: Some("Jahapur, Murshidabad".to_string()),
        permanent_address: Some("Jahapur, Murshidabad".to_string()),
        mobile_number: Some("01711000000".to_string()),
        profession: Some("Teacher".to_string()),
        t_shirt_size: Some("L".to_string()),
        blood_group: Some("O+".to_string()),
        payment_years: Some(Scalar::from(2)),
        payment_method: Some("bKash".to_string()),
        ..MembershipSubmission::default()
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        frontend_url,
        show_receipt,
        skip_declarations,
    } = args;

    let now = Utc::now();
    let notifier = RecordingNotifier::default();
    let documents = MemoryDocumentStore::default();
    let registry = build_registry(
        RegistryOptions {
            frontend_url,
            documents: Arc::new(documents.clone()),
            notifier: Arc::new(notifier.clone()),
            passwords: None,
        },
        Snapshot::default(),
        now,
    )?;
    let admin_account = seed_admin(
        &registry,
        &AdminConfig {
            token: None,
            name: "Demo Admin".to_string(),
            email: "admin@example.com".to_string(),
        },
        now,
    )?;
    let admin = Caller::acting_as(admin_account.actor());

    println!("Alumni registry demo");
    println!("\nMembership intake");
    let application = registry
        .membership
        .submit(demo_membership_submission(), now)?;
    println!(
        "- Application {} from {} -> {} | {} x {} year(s) = BDT {}",
        application.id,
        application.full_name,
        application.approval.status.label(),
        application.yearly_fee,
        application.payment_years,
        application.total_paid_amount
    );

    let approved = registry.membership.approve(&admin, application.id, now)?;
    println!(
        "- Approved: member {} (user {})",
        approved.user.member_id.as_deref().unwrap_or("-"),
        approved.user.id
    );
    if let SideEffect::MemberProvisioned {
        membership_expires_at,
        ..
    } = &approved.effect
    {
        match membership_expires_at {
            Some(at) => println!("  Membership valid until {}", at.format("%d %B %Y")),
            None => println!("  Membership does not expire"),
        }
    }

    let member = Caller::acting_as(
        registry
            .members
            .account(approved.user.id)?
            .map(|account| account.actor())
            .ok_or(ServiceError::NotFound(MEMBER_NOT_FOUND))?,
    );

    println!("\nMember payment");
    let payment = registry.payments.submit(
        &member,
        PaymentSubmission {
            payment_purpose: Some("YEARLY_SUBSCRIPTION_GENERAL_MEMBER".to_string()),
            payment_method: Some("bKash".to_string()),
            payment_amount: Some(Scalar::from("500.00")),
            payment_proof_file: Some("payments/demo-proof.png".to_string()),
            ..PaymentSubmission::default()
        },
        now,
    )?;
    println!(
        "- Payment {} for {} (pre-filled payer: {}, {})",
        payment.id,
        payment.payment_purpose.label(),
        payment.name,
        payment.mobile_number
    );
    let approved_payment = registry.payments.approve(&admin, payment.id, now)?;
    match &approved_payment.effect {
        SideEffect::ReceiptIssued { receipt_file } => {
            println!("  Receipt stored at {receipt_file}");
            if show_receipt {
                if let Some(document) = documents.get(receipt_file).map_err(ServiceError::from)? {
                    println!("{}", String::from_utf8_lossy(&document.bytes));
                }
            }
        }
        _ => println!("  Receipt could not be stored"),
    }

    if !skip_declarations {
        run_declarations(&registry, &admin, &member)?;
    }

    println!("\nNotifications dispatched");
    for notification in notifier.sent() {
        println!(
            "  - {} to {}: {}",
            notification.channel(),
            notification.recipient(),
            notification.body().lines().next().unwrap_or_default()
        );
    }

    Ok(())
}

fn run_declarations(registry: &Registry, admin: &Caller, member: &Caller) -> Result<(), AppError> {
    let now = Utc::now();

    println!("\nScholarship application");
    let scholarship = registry.scholarships.submit(
        &Caller::anonymous(),
        ScholarshipSubmission {
            scholarship_id: Some(Scalar::from(1)),
            applicant_name: Some("Nusrat Jahan".to_string()),
            applicant_phone: Some("+880 1811-223344".to_string()),
            class_or_grade: Some("Class 8".to_string()),
            applicant_signature: Some("signatures/nusrat.png".to_string()),
            ..ScholarshipSubmission::default()
        },
        now,
    )?;
    println!(
        "- {} applied to \"{}\" (phone stored as {})",
        scholarship.application.applicant_name,
        scholarship
            .scholarship
            .as_ref()
            .map(|programme| programme.title.as_str())
            .unwrap_or("unknown programme"),
        scholarship.application.applicant_phone
    );
    let rejected = registry.scholarships.reject(
        admin,
        scholarship.application.id,
        RejectRequest {
            rejected_reason: Some("Result sheet missing".to_string()),
        },
        now,
    )?;
    println!(
        "  {} ({})",
        rejected.application.approval.status.label(),
        rejected
            .application
            .approval
            .rejected_reason
            .as_deref()
            .unwrap_or_default()
    );

    println!("\nSelf-declaration");
    let declaration = registry.declarations.submit(
        member,
        DeclarationSubmission {
            name: Some("Rahim Uddin".to_string()),
            signature_file: Some("self-declarations/signature_demo.png".to_string()),
            secondary_member_type_id: Some(Scalar::from(7)),
            date: Some(now.format("%Y-%m-%d").to_string()),
        },
        now,
    )?;
    let approved = registry
        .declarations
        .approve(admin, declaration.declaration.id, now)?;
    if let SideEffect::SecondaryTypeAssigned {
        user_id,
        secondary_member_type_id,
    } = approved.effect
    {
        let role = registry
            .catalog
            .member_type(RecordId(secondary_member_type_id))?
            .map(|member_type| member_type.name)
            .unwrap_or_default();
        println!("- User {user_id} now serves as {role}");
    }
    Ok(())
}
