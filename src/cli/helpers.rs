//! Shared helper functions for CLI commands
//!
//! Session setup, reference resolution and argument parsing used across
//! multiple command modules.

use chrono::NaiveDate;
use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{format_display_id, parse_display_id};
use crate::core::{Config, Workspace};
use crate::entities::{Action, KeyResult, KeyResultUnit, Okr};
use crate::sync::{self, SyncCoordinator, SyncOutcome};

/// Everything a data command needs: where it runs and a loaded coordinator
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub coordinator: SyncCoordinator,
}

/// Discover the workspace, build the coordinator and load the hierarchy
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    let workspace = discover_workspace(global)?;
    let config = Config::load_for(Some(&workspace));
    let mut coordinator = sync::open(&workspace, &config)?;
    let outcome = coordinator.load()?;
    report_outcome(outcome, global);

    Ok(Session {
        workspace,
        config,
        coordinator,
    })
}

pub fn discover_workspace(global: &GlobalOpts) -> Result<Workspace> {
    match &global.workspace {
        Some(path) => Workspace::discover_from(path),
        None => Workspace::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))
}

/// `--format`, else the configured `default_format`, else auto
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|raw| OutputFormat::from_str(raw.trim(), true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Print a fallback warning on stderr; successful outcomes print nothing
pub fn report_outcome(outcome: SyncOutcome, global: &GlobalOpts) {
    if let SyncOutcome::Fallback(failure) = outcome {
        if !global.quiet {
            eprintln!("{:?}", miette::Report::new(failure));
        }
    }
}

/// Resolve an OKR reference: display id (`OKR-3`, `okr-3` or `3`), full id,
/// or an unambiguous id prefix
pub fn resolve_okr<'a>(okrs: &'a [Okr], reference: &str) -> Result<&'a Okr> {
    let reference = reference.trim();

    let display = if reference.chars().all(|c| c.is_ascii_digit()) {
        reference.parse::<u64>().ok().map(format_display_id)
    } else {
        Some(reference.to_uppercase())
    };
    if let Some(display) = display.filter(|d| parse_display_id(d).is_some()) {
        if let Some(okr) = okrs
            .iter()
            .find(|okr| okr.display_id.as_deref() == Some(display.as_str()))
        {
            return Ok(okr);
        }
    }

    if let Some(okr) = okrs.iter().find(|okr| okr.id == reference) {
        return Ok(okr);
    }

    let candidates: Vec<&Okr> = okrs
        .iter()
        .filter(|okr| !reference.is_empty() && okr.id.starts_with(reference))
        .collect();
    match candidates.as_slice() {
        [okr] => Ok(okr),
        [] => Err(miette::miette!("No OKR matches '{}'", reference)),
        many => Err(miette::miette!(
            "'{}' is ambiguous: {}",
            reference,
            many.iter()
                .map(|okr| okr.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

/// Resolve a key result by id, 1-based position or metric name
pub fn resolve_key_result<'a>(okr: &'a Okr, reference: &str) -> Result<&'a KeyResult> {
    let reference = reference.trim();
    if let Ok(index) = reference.parse::<usize>() {
        if let Some(kr) = index.checked_sub(1).and_then(|i| okr.key_results.get(i)) {
            return Ok(kr);
        }
    }
    okr.key_results
        .iter()
        .find(|kr| kr.id == reference || kr.metric_name.eq_ignore_ascii_case(reference))
        .ok_or_else(|| miette::miette!("{} has no key result '{}'", okr.label(), reference))
}

/// Resolve an action by id or 1-based position
pub fn resolve_action<'a>(okr: &'a Okr, reference: &str) -> Result<&'a Action> {
    let reference = reference.trim();
    if let Ok(index) = reference.parse::<usize>() {
        if let Some(action) = index.checked_sub(1).and_then(|i| okr.actions.get(i)) {
            return Ok(action);
        }
    }
    okr.actions
        .iter()
        .find(|action| action.id == reference)
        .ok_or_else(|| miette::miette!("{} has no action '{}'", okr.label(), reference))
}

/// Parse `METRIC:FROM:TO[:UNIT]`, e.g. `Revenue:100:250:number`
pub fn parse_key_result(input: &str) -> Result<KeyResult> {
    let mut parts: Vec<&str> = input.split(':').map(str::trim).collect();

    let unit = match parts.last().map(|p| p.parse::<KeyResultUnit>()) {
        Some(Ok(unit)) if parts.len() >= 4 => {
            parts.pop();
            unit
        }
        _ => KeyResultUnit::default(),
    };

    if parts.len() < 3 {
        return Err(miette::miette!(
            "Invalid key result '{}': expected METRIC:FROM:TO[:UNIT]",
            input
        ));
    }
    let to = parse_number(parts.pop().unwrap_or_default(), input)?;
    let from = parse_number(parts.pop().unwrap_or_default(), input)?;
    let metric = parts.join(":");
    if metric.is_empty() {
        return Err(miette::miette!("Invalid key result '{}': metric name is empty", input));
    }

    Ok(KeyResult::new(metric, from, to).with_unit(unit))
}

fn parse_number(raw: &str, input: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| miette::miette!("Invalid number '{}' in '{}'", raw, input))
}

/// Parse `KEY=VALUE` pairs such as `--kr 1=42`
pub fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| miette::miette!("Expected KEY=VALUE, got '{}'", raw))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| miette::miette!("Invalid date '{}' (expected YYYY-MM-DD): {}", raw, e))
}

/// Parse `YYYY-MM-DD text of the action`
pub fn parse_action(raw: &str, owner: &str) -> Result<Action> {
    let (date, text) = raw
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| miette::miette!("Expected 'YYYY-MM-DD action text', got '{}'", raw))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(miette::miette!("Action text is empty in '{}'", raw));
    }
    Ok(Action::new(text, owner, parse_date(date)?))
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Short form of an opaque id for tables
pub fn short_id(id: &str) -> String {
    if id.len() > 16 {
        truncate_str(id, 16)
    } else {
        id.to_string()
    }
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green(), message);
}
