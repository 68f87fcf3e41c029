use atty::Stream;
use color_eyre::Result;
use serde_json::Value;
use skynet_core::{CommandInfo, CommandStatus, ExecutionOutcome};

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

/// Exit code for an outcome: the failing tool's own status when one is
/// recorded, otherwise 0 for success, 1 for user errors and 2 for failures.
pub fn exit_code(outcome: &ExecutionOutcome) -> i32 {
    if let Some(code) = outcome.tool_exit_code() {
        if code != 0 {
            return code;
        }
    }
    match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    }
}

pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = exit_code(outcome);

    if opts.json {
        let payload = skynet_core::to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if opts.quiet {
        if !outcome.is_ok() {
            let style = Style::new(opts.no_color, atty::is(Stream::Stderr));
            let message = skynet_core::format_status_message(info, &outcome.message);
            eprintln!("{}", style.status(outcome.status, &message));
        }
        return Ok(code);
    }

    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
    if outcome.is_ok() {
        if is_passthrough(&outcome.details) {
            if !outcome.message.is_empty() {
                println!("{}", outcome.message);
            }
            return Ok(code);
        }
        let message = skynet_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(outcome.status, &message));
        for (action, description) in plan_lines(&outcome.details) {
            println!("{}", style.plan_step(&action, &description));
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!("{}", style.info(&format!("Tip: {hint}")));
        }
    } else {
        let message = skynet_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(outcome.status, &message));
        let why = collect_why_bullets(&outcome.details);
        if !why.is_empty() {
            println!();
            println!("Why:");
            for reason in why {
                println!("  • {reason}");
            }
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!();
            println!("Fix:");
            println!("{}", style.fix_bullet(&format!("  • {hint}")));
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// `(action, indented description)` for every step of a dry-run plan.
fn plan_lines(details: &Value) -> Vec<(String, String)> {
    let Some(plan) = details.get("plan").and_then(Value::as_array) else {
        return Vec::new();
    };
    plan.iter()
        .filter_map(|step| {
            let action = step.get("action")?.as_str()?;
            let description = step.get("description")?.as_str()?;
            let depth = step.get("depth").and_then(Value::as_u64).unwrap_or(0);
            let indent = "  ".repeat(usize::try_from(depth).unwrap_or(0));
            Some((action.to_string(), format!("{indent}{description}")))
        })
        .collect()
}

fn collect_why_bullets(details: &Value) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(&mut bullets, reason_display(reason).unwrap_or(reason));
    }
    if let Some(command) = details.get("command").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("Command: {command}"));
    }
    if let Some(changes) = details.get("changes").and_then(Value::as_array) {
        for change in changes.iter().filter_map(Value::as_str) {
            push_unique(&mut bullets, change.trim());
        }
    }
    if let Some(record) = details.get("record").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("Missing: {record}"));
    }
    bullets
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "dirty_worktree" => Some("The working tree has uncommitted changes:"),
        "vcs_unavailable" => Some("Not inside a git repository, or git is not on PATH."),
        "tool_missing" => Some("A required tool could not be started."),
        "tool_failed" => Some("A tool exited with a non-zero status."),
        "no_artifacts" => Some("dist/ holds nothing to upload."),
        "install_record_missing" => Some("No install record was found."),
        "python_missing" => Some("No Python interpreter was found."),
        "unknown_variable" => Some("Only PART, TEST, PROJECT_NAME and REPOSITORY_NAME can be set."),
        "invalid_assignment" => Some("Variables are passed as VAR=VALUE."),
        _ => None,
    }
}
