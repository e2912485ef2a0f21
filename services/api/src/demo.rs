use crate::infra::{InMemoryApplicationRepository, InMemoryNotifier, InMemoryProfileDirectory};
use clap::Args;
use internlink::error::AppError;
use internlink::workflows::applications::{
    ApplicationError, ApplicationStatus, ApplicationSubmission, CandidateId, EligibilityBands,
    InternshipApplicationService, NotificationRequest, OpportunityId, OrganizationId, Recipient,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Seeded candidate to walk through the lifecycle
    #[arg(long, default_value = "cand-amara")]
    pub(crate) candidate: String,
    /// Seeded posting the candidate applies to
    #[arg(long, default_value = "opp-data")]
    pub(crate) opportunity: String,
    /// Organization that owns the posting
    #[arg(long, default_value = "org-brightpath")]
    pub(crate) organization: String,
    /// Minimum score for the strong tier
    #[arg(long)]
    pub(crate) strong_min: Option<u8>,
    /// Minimum score for the partial tier
    #[arg(long)]
    pub(crate) partial_min: Option<u8>,
    /// Accept the candidate instead of withdrawing after review
    #[arg(long)]
    pub(crate) accept: bool,
}

type DemoService = InternshipApplicationService<
    InMemoryApplicationRepository,
    InMemoryProfileDirectory,
    InMemoryNotifier,
>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let defaults = EligibilityBands::default();
    let bands = EligibilityBands::new(
        args.strong_min.unwrap_or(defaults.strong_min()),
        args.partial_min.unwrap_or(defaults.partial_min()),
    )
    .unwrap_or_else(|| {
        println!("Ignoring invalid tier thresholds; using defaults");
        defaults
    });

    let notifier = Arc::new(InMemoryNotifier::default());
    let service: DemoService = InternshipApplicationService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryProfileDirectory::seeded()),
        notifier.clone(),
        bands,
    );

    let candidate_id = CandidateId(args.candidate);
    let opportunity_id = OpportunityId(args.opportunity);

    println!("InternLink lifecycle demo");
    println!(
        "Candidate: {} | Posting: {} | Tiers: strong >= {}%, partial >= {}%",
        candidate_id,
        opportunity_id,
        bands.strong_min(),
        bands.partial_min()
    );

    let report = service.compute_eligibility(&candidate_id, &opportunity_id)?;
    println!("\nEligibility");
    println!("  {}", report.summary());
    println!("  Matched: {}", list_or_none(&report.matched_skills));
    println!("  Missing: {}", list_or_none(&report.missing_skills));

    println!("\nApplication");
    let submission = ApplicationSubmission {
        candidate_id: candidate_id.clone(),
        opportunity_id: opportunity_id.clone(),
        organization_id: OrganizationId(args.organization),
        cover_letter: Some("I would love to contribute to your team.".to_string()),
    };
    let application = match service.apply(submission.clone()) {
        Ok(application) => application,
        Err(err @ ApplicationError::OpportunityClosed { .. }) => {
            println!("  Submission rejected: {}", err);
            render_notifications(&notifier.events());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "  {} created for '{}' with status {}",
        application.id,
        application.opportunity_title,
        application.status.label()
    );

    match service.apply(submission) {
        Err(err @ ApplicationError::DuplicateApplication { .. }) => {
            println!("  Second submission blocked: {}", err);
        }
        Err(err) => return Err(err.into()),
        Ok(duplicate) => println!("  Unexpected duplicate accepted: {}", duplicate.id),
    }

    println!("\nReview");
    let reviewed = service.transition_application(
        &application.id,
        ApplicationStatus::UnderReview,
        Some("Portfolio looks promising".to_string()),
    )?;
    println!("  Status: {}", reviewed.status.label());

    let finished = if args.accept {
        service.transition_application(
            &application.id,
            ApplicationStatus::Accepted,
            Some("Welcome aboard".to_string()),
        )?
    } else {
        service.withdraw(&application.id, &candidate_id)?
    };
    println!("  Status: {}", finished.status.label());

    match service.transition_application(&application.id, ApplicationStatus::Interview, None) {
        Err(err) => println!("  Reopening refused: {}", err),
        Ok(record) => println!("  Unexpected reopen to {}", record.status.label()),
    }

    let view = finished.status_view();
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("\nStatus payload:\n{}", json),
        Err(err) => println!("\nStatus payload unavailable: {}", err),
    }

    render_notifications(&notifier.events());
    Ok(())
}

fn render_notifications(events: &[NotificationRequest]) {
    if events.is_empty() {
        println!("\nNotifications: none dispatched");
        return;
    }

    println!("\nNotifications");
    for event in events {
        let recipient = match &event.recipient {
            Recipient::Candidate(id) => format!("candidate {}", id),
            Recipient::Organization(id) => format!("organization {}", id),
        };
        let status = event.payload.status.as_deref().unwrap_or("-");
        println!("  {:?} -> {} (status: {})", event.kind, recipient, status);
    }
}

fn list_or_none(skills: &[String]) -> String {
    if skills.is_empty() {
        "none".to_string()
    } else {
        skills.join(", ")
    }
}
