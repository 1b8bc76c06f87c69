//! `okr checkin` command - Record progress, status, notes and actions

use chrono::Utc;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    open_session, parse_action, report_outcome, resolve_action, resolve_key_result, resolve_okr,
    split_assignment,
};
use crate::cli::GlobalOpts;
use crate::core::Status;
use crate::entities::{CheckIn, KeyResultUpdate, Okr};

#[derive(clap::Args, Debug)]
pub struct CheckinArgs {
    /// OKR reference (OKR-3, 3, full id or id prefix)
    pub okr: String,

    /// Current value of a key result as KR=VALUE (KR is position, id or metric)
    #[arg(long = "kr", short = 'k', value_name = "KR=VALUE")]
    pub kr_values: Vec<String>,

    /// Status of a key result as KR=STATUS
    #[arg(long = "kr-status", value_name = "KR=STATUS")]
    pub kr_statuses: Vec<String>,

    /// Overall status
    #[arg(long, short = 's')]
    pub status: Option<Status>,

    /// What is getting in the way (empty clears)
    #[arg(long)]
    pub challenges: Option<String>,

    /// Help needed from others (empty clears)
    #[arg(long)]
    pub needs: Option<String>,

    /// Free-form notes (empty clears)
    #[arg(long)]
    pub comments: Option<String>,

    /// New action as "YYYY-MM-DD text"; repeatable
    #[arg(long = "add-action", value_name = "DATE TEXT")]
    pub add_actions: Vec<String>,

    /// Owner for actions added in this check-in (default: configured owner)
    #[arg(long = "action-owner")]
    pub action_owner: Option<String>,

    /// Mark an action completed, by position or id; repeatable
    #[arg(long)]
    pub complete: Vec<String>,

    /// Reopen a completed action, by position or id; repeatable
    #[arg(long)]
    pub reopen: Vec<String>,
}

pub fn run(args: CheckinArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let okr = resolve_okr(session.coordinator.okrs(), &args.okr)?;
    let owner = args
        .action_owner
        .clone()
        .unwrap_or_else(|| session.config.owner());

    let check_in = build_check_in(&args, okr, &owner)?;
    if check_in.is_empty() {
        return Err(miette::miette!(
            help = "pass --kr, --status, --comments, --add-action or similar",
            "Nothing to record"
        ));
    }

    let id = okr.id.clone();
    let label = okr.label();
    let outcome = session.coordinator.check_in(&id, &check_in, Utc::now())?;
    report_outcome(outcome, global);

    if !global.quiet {
        println!("{} Checked in {}", style("✓").green(), style(label).cyan());
    }
    Ok(())
}

fn build_check_in(args: &CheckinArgs, okr: &Okr, owner: &str) -> Result<CheckIn> {
    let mut check_in = CheckIn {
        status: args.status,
        challenges: args.challenges.clone(),
        needs: args.needs.clone(),
        comments: args.comments.clone(),
        ..Default::default()
    };

    for raw in &args.kr_values {
        let (reference, value) = split_assignment(raw)?;
        let kr = resolve_key_result(okr, reference)?;
        let current = value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| miette::miette!("Invalid value '{}' for {}", value, kr.metric_name))?;
        update_for(&mut check_in, &kr.id).current = Some(current);
    }

    for raw in &args.kr_statuses {
        let (reference, value) = split_assignment(raw)?;
        let kr = resolve_key_result(okr, reference)?;
        let status = value.parse::<Status>().map_err(|e| miette::miette!("{}", e))?;
        update_for(&mut check_in, &kr.id).status = Some(status);
    }

    for raw in &args.add_actions {
        check_in.new_actions.push(parse_action(raw, owner)?);
    }
    for reference in &args.complete {
        check_in
            .complete_actions
            .push(resolve_action(okr, reference)?.id.clone());
    }
    for reference in &args.reopen {
        check_in
            .reopen_actions
            .push(resolve_action(okr, reference)?.id.clone());
    }

    Ok(check_in)
}

// One update per key result, however many flags touch it
fn update_for<'a>(check_in: &'a mut CheckIn, key_result_id: &str) -> &'a mut KeyResultUpdate {
    let index = match check_in
        .key_results
        .iter()
        .position(|update| update.key_result_id == key_result_id)
    {
        Some(index) => index,
        None => {
            check_in.key_results.push(KeyResultUpdate {
                key_result_id: key_result_id.to_string(),
                current: None,
                status: None,
            });
            check_in.key_results.len() - 1
        }
    };
    &mut check_in.key_results[index]
}
