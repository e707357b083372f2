use eventos_meta::classification::{
    write_csv, ClassificationReport, CriterionId, EventId, RankingOutcome, RegistrationId,
};
use eventos_meta::config::AppConfig;
use eventos_meta::error::AppError;
use std::fs::File;
use std::io::{self, BufWriter};

use crate::cli::{ExportArgs, RankArgs, ReportArgs, ValidateArgs};
use crate::infra::Workspace;

pub(crate) fn run_rank(config: &AppConfig, args: RankArgs) -> Result<(), AppError> {
    let workspace = Workspace::open(config, &args.dataset)?;
    let outcome = workspace.service.rank(&EventId(args.event))?;
    render_outcome(&outcome);

    if let Some(path) = args.save {
        workspace.save(&path)?;
    }
    Ok(())
}

pub(crate) fn run_report(config: &AppConfig, args: ReportArgs) -> Result<(), AppError> {
    let workspace = Workspace::open(config, &args.dataset)?;
    let report = workspace.service.build_report(&EventId(args.event))?;

    if args.json {
        let stdout = io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &report)?;
        println!();
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_export_csv(config: &AppConfig, args: ExportArgs) -> Result<(), AppError> {
    let workspace = Workspace::open(config, &args.dataset)?;
    let rows = workspace.service.export_csv(&EventId(args.event))?;

    match args.output {
        Some(path) => {
            write_csv(&rows, BufWriter::new(File::create(&path)?))?;
            println!("Exported {} rows to {}", rows.len(), path.display());
        }
        None => write_csv(&rows, io::stdout().lock())?,
    }
    Ok(())
}

pub(crate) fn run_validate(config: &AppConfig, args: ValidateArgs) -> Result<(), AppError> {
    let workspace = Workspace::open(config, &args.dataset)?;
    let award = workspace.service.validate_custom_award(
        &RegistrationId(args.registration),
        &CriterionId(args.criterion),
        args.points,
        &args.validator,
    )?;

    println!(
        "{} validated for {}: {} weighted points",
        award.criterion_id, award.registration_id, award.points
    );
    println!("Run `rank` again to refresh positions.");

    match args.save {
        Some(path) => workspace.save(&path)?,
        None => println!("Dataset not saved (pass --save <path> to persist the grant)."),
    }
    Ok(())
}

fn render_outcome(outcome: &RankingOutcome) {
    println!(
        "{} ranked: {} registrations, {} approved, {} waitlisted (capacity {})",
        outcome.event_id,
        outcome.ranked.len(),
        outcome.approved(),
        outcome.waitlisted(),
        outcome.capacity
    );

    for entry in &outcome.ranked {
        println!(
            "{:>4}. {:<32} {:>8}  {}",
            entry.position(),
            entry.applicant.name,
            entry.score(),
            entry.registration.status.label()
        );
    }
}

fn render_report(report: &ClassificationReport) {
    let event = &report.event;
    println!("{} ({})", event.name, event.modality);
    println!(
        "Status: {} | registrations {}",
        event.status,
        if event.registration_open {
            "open"
        } else {
            "closed"
        }
    );
    println!(
        "Capacity: {} seats, minimum {}, {} available",
        report.capacity.total, report.capacity.minimum, report.capacity.available
    );
    println!(
        "Registrations: {} total, {} approved, {} waitlisted",
        report.registrations.total, report.registrations.approved, report.registrations.waitlisted
    );

    println!("\nCriteria");
    for criterion in &report.criteria {
        let inactive = if criterion.active { "" } else { " [inactive]" };
        println!(
            "- {}. {} ({}) weight {}{}",
            criterion.order, criterion.name, criterion.kind_label, criterion.weight, inactive
        );
        if criterion.reserved > 0 {
            println!(
                "    reservation: {} {}",
                criterion.reservation_label, criterion.reserved
            );
        }
    }

    println!("\nClassification");
    if report.ranked.is_empty() {
        println!("- No registrations yet");
        return;
    }
    for entry in &report.ranked {
        println!(
            "{:>4}. {:<32} {:>8}  {}  {}",
            entry.position, entry.name, entry.score, entry.registered_at, entry.situation
        );
        for award in &entry.awards {
            let pending = if award.validated {
                ""
            } else {
                " (pending validation)"
            };
            println!(
                "      {}: {} base -> {} points{}",
                award.criterion, award.base, award.points, pending
            );
        }
    }
}
