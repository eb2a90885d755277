use crate::cli::RosterSourceArgs;
use crate::infra::load_roster;
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use daycare::config::AppConfig;
use daycare::error::AppError;
use daycare::ratio::{RatioPolicy, StatusIndicator};
use daycare::roster::{ClassroomId, ClassroomRatioView, RatioOverview, RosterService};
use std::fmt::Write;

#[derive(Args, Debug, Default)]
pub(crate) struct RatioReportArgs {
    #[command(flatten)]
    pub(crate) roster: RosterSourceArgs,
    /// Evaluation date for child ages (defaults to today)
    #[arg(long, value_parser = daycare::dates::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Only report this classroom id
    #[arg(long)]
    pub(crate) classroom: Option<String>,
    /// List each child with age and ratio group
    #[arg(long)]
    pub(crate) list_children: bool,
}

pub(crate) fn run_ratio_report(args: RatioReportArgs) -> Result<(), AppError> {
    let RatioReportArgs {
        roster,
        as_of,
        classroom,
        list_children,
    } = args;

    let config = AppConfig::load()?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let repository = load_roster(&roster, as_of, Utc::now())?;
    let service = RosterService::new(repository, RatioPolicy::from(&config.ratio));

    let output = match classroom {
        Some(classroom) => {
            let view = service.classroom_ratio(&ClassroomId(classroom), as_of)?;
            let mut output = format!("Ratio report for {as_of}\n");
            render_classroom(&mut output, &view, list_children);
            output
        }
        None => render_overview(&service.ratio_overview(as_of)?, list_children),
    };
    print!("{output}");
    Ok(())
}

pub(crate) fn render_overview(overview: &RatioOverview, list_children: bool) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Ratio report for {}", overview.as_of);
    let _ = writeln!(
        output,
        "- {} children present | {} staff on duty | {} over ratio | {} at capacity",
        overview.total_children,
        overview.total_staff,
        overview.over_ratio_classrooms,
        overview.at_capacity_classrooms
    );
    for view in &overview.classrooms {
        render_classroom(&mut output, view, list_children);
    }
    output
}

pub(crate) fn render_classroom(output: &mut String, view: &ClassroomRatioView, list_children: bool) {
    let marker = match view.status.status_indicator {
        StatusIndicator::Good => " ",
        StatusIndicator::Warning => "~",
        StatusIndicator::Critical => "!",
    };
    let _ = writeln!(
        output,
        "{marker} {} ({}): {}",
        view.classroom_name,
        view.classroom_id,
        view.status.summary()
    );
    if let Some(group) = view.status.required_ratio.dominant_group() {
        let _ = writeln!(output, "    binding group: {}", group.label());
    }
    if view.status.unclassified_children > 0 {
        let _ = writeln!(
            output,
            "    {} child(ren) without a birth date or kindergarten flag",
            view.status.unclassified_children
        );
    }
    if list_children {
        for child in &view.children {
            let age = child
                .age_in_months
                .map(|months| format!("{months} mo"))
                .unwrap_or_else(|| "age unknown".to_string());
            let _ = writeln!(
                output,
                "    - {} {} [{}] {} | {}",
                child.first_name,
                child.last_name,
                child.child_id,
                age,
                child.ratio_group_label.unwrap_or("unclassified")
            );
        }
    }
}
