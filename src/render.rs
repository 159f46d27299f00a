//! Plain-text renderings for the command line: entity tables and validation
//! reports. Structured output (JSON/YAML) goes through serde directly.

use crate::catalog::{Action, Capability, RepoMeta};
use crate::validation::{ActionsValidation, CatalogValidation, InvalidEntity, RepoValidation};
use std::fmt::Write as _;

const RULE_WIDTH: usize = 78;

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}~")
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

pub fn repo_table(repos: &[&RepoMeta]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<6} {:<8} {:<12} {:<12} Owner",
        "Repository", "Stage", "Tier", "Status", "Domain"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for repo in repos {
        let stage = repo
            .stage
            .map(|stage| format!("S{stage}"))
            .unwrap_or_else(|| "-".to_string());
        let tier = repo.tier.as_ref().map(|tier| tier.as_str()).unwrap_or("-");
        let _ = writeln!(
            out,
            "{:<24} {:<6} {:<8} {:<12} {:<12} {}",
            truncate(repo.label(), 24),
            stage,
            tier,
            truncate(or_dash(&repo.status), 12),
            truncate(or_dash(&repo.domain), 12),
            or_dash(&repo.owner)
        );
    }
    let _ = writeln!(out, "\nTotal: {} repositories", repos.len());
    out
}

pub fn capability_table(capabilities: &[&Capability]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<32} {:<12} {:<10} Name", "Capability", "Domain", "Auth");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for cap in capabilities {
        let _ = writeln!(
            out,
            "{:<32} {:<12} {:<10} {}",
            truncate(cap.id.as_str(), 32),
            truncate(cap.domain.as_deref().unwrap_or("-"), 12),
            truncate(or_dash(&cap.auth), 10),
            truncate(or_dash(&cap.name), 22)
        );
    }
    let _ = writeln!(out, "\nTotal: {} capabilities", capabilities.len());
    out
}

pub fn action_table(actions: &[&Action]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28} {:<7} {:<30} Repository",
        "Action", "Method", "Path"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for action in actions {
        let _ = writeln!(
            out,
            "{:<28} {:<7} {:<30} {}",
            truncate(action.id.as_str(), 28),
            or_dash(&action.http.method).to_ascii_uppercase(),
            truncate(or_dash(&action.http.path), 30),
            or_dash(&action.repo)
        );
    }
    let _ = writeln!(out, "\nTotal: {} actions", actions.len());
    out
}

fn push_invalid(out: &mut String, heading: &str, entries: impl IntoIterator<Item = (String, Vec<String>)>) {
    let mut entries = entries.into_iter().peekable();
    if entries.peek().is_none() {
        return;
    }
    let _ = writeln!(out, "\n{heading}:");
    for (key, errors) in entries {
        let _ = writeln!(out, "  {key}:");
        for error in errors {
            let _ = writeln!(out, "    - {error}");
        }
    }
}

fn entity_pairs(invalid: &[InvalidEntity]) -> impl Iterator<Item = (String, Vec<String>)> + '_ {
    invalid
        .iter()
        .map(|entry| (entry.id.clone(), entry.errors.clone()))
}

pub fn repo_report(report: &RepoValidation) -> String {
    let mut out = String::from("=== REPOS VALIDATION ===\n");
    let _ = writeln!(out, "Total repositories: {}", report.total_repos);
    let _ = writeln!(out, "Valid: {}", report.valid_repos);
    let _ = writeln!(out, "Invalid: {}", report.invalid_repos.len());
    push_invalid(
        &mut out,
        "Invalid repositories",
        report
            .invalid_repos
            .iter()
            .map(|entry| (entry.name.clone(), entry.errors.clone())),
    );
    out.push_str(&verdict(report.is_valid(), "All repositories are valid"));
    out
}

pub fn actions_report(report: &ActionsValidation) -> String {
    let mut out = String::from("=== ACTIONS VALIDATION ===\n");
    let _ = writeln!(
        out,
        "Capabilities: {}/{} valid",
        report.capabilities.valid, report.capabilities.total
    );
    let _ = writeln!(
        out,
        "Actions: {}/{} valid",
        report.actions.valid, report.actions.total
    );
    push_invalid(&mut out, "Invalid capabilities", entity_pairs(&report.capabilities.invalid));
    push_invalid(&mut out, "Invalid actions", entity_pairs(&report.actions.invalid));
    out.push_str(&verdict(report.valid, "All capabilities and actions are valid"));
    out
}

pub fn full_report(report: &CatalogValidation) -> String {
    let mut out = String::from("=== FULL VALIDATION ===\n");
    let _ = writeln!(
        out,
        "Repositories: {}/{} valid",
        report.repos.valid_repos, report.repos.total_repos
    );
    let _ = writeln!(
        out,
        "Capabilities: {}/{} valid",
        report.actions.capabilities.valid, report.actions.capabilities.total
    );
    let _ = writeln!(
        out,
        "Actions: {}/{} valid",
        report.actions.actions.valid, report.actions.actions.total
    );
    push_invalid(
        &mut out,
        "Invalid repositories",
        report
            .repos
            .invalid_repos
            .iter()
            .map(|entry| (entry.name.clone(), entry.errors.clone())),
    );
    push_invalid(
        &mut out,
        "Invalid capabilities",
        entity_pairs(&report.actions.capabilities.invalid),
    );
    push_invalid(&mut out, "Invalid actions", entity_pairs(&report.actions.actions.invalid));
    out.push_str(&verdict(report.valid, "All configurations are valid"));
    out
}

fn verdict(valid: bool, ok: &str) -> String {
    if valid {
        format!("\nOK: {ok}\n")
    } else {
        "\nFAILED: see errors above\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionHttp, ActionId, Catalog, RepoId, Tier};
    use crate::validation::validate_actions;

    #[test]
    fn repo_table_lists_rows_and_total() {
        let repo = RepoMeta {
            id: RepoId::from("svc1"),
            stage: Some(2),
            tier: Some(Tier::Tier0),
            status: "active".into(),
            domain: "core".into(),
            owner: "team-a".into(),
            ..Default::default()
        };
        let table = repo_table(&[&repo]);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("svc1 "));
        assert!(row.contains("S2"));
        assert!(row.contains("tier_0"));
        assert!(row.ends_with("team-a"));
        assert!(table.contains("Total: 1 repositories"));
    }

    #[test]
    fn long_values_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn actions_report_lists_every_error() {
        let catalog = Catalog {
            actions: vec![Action {
                id: ActionId::from("act2"),
                http: ActionHttp {
                    method: "GET".into(),
                    path: "/v2/thing".into(),
                },
                capability_id: "missing-cap".into(),
                repo: "svc1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let text = actions_report(&validate_actions(&catalog));
        assert!(text.contains("Actions: 0/1 valid"));
        assert!(text.contains("  act2:\n"));
        assert!(text.contains("    - capability_id 'missing-cap' does not exist\n"));
        assert!(text.contains("    - repo 'svc1' does not exist\n"));
        assert!(text.ends_with("FAILED: see errors above\n"));
    }
}
