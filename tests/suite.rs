// Integration suite for the capability index: loads fixture catalogs from disk
// and drives the query, validation and generation paths end to end, then checks
// the same behavior through the index-cli binary.
mod support;

use anyhow::Result;
use capindex::{
    ActionFilter, CapabilityId, CatalogError, EdgeKind, IndexRoot, RepoFilter, RepoId, Tier,
    discover_root, filter_actions, filter_repos, generate_capability_index, generate_openapi,
    generate_service_graph, graph_to_mermaid, validate_actions, validate_all, write_graphs,
    write_openapi,
};
use serde_json::Value;
use std::fs;
use support::{
    ACTIONS_YML, catalog_root, cli, fixture_root, invalid_root, run_command,
    run_command_expect_failure, stderr, stdout,
};

#[test]
fn end_to_end_example() -> Result<()> {
    let dir = fixture_root()?;
    let catalog = IndexRoot::open(dir.path().to_path_buf())?.load()?;

    let svc1_actions = filter_actions(
        &catalog,
        &ActionFilter {
            repo: Some("svc1".into()),
            ..Default::default()
        },
    );
    let ids: Vec<_> = svc1_actions.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["act1"]);

    let report = validate_all(&catalog);
    assert!(report.valid, "{report:?}");
    assert!(report.repos.invalid_repos.is_empty());
    assert!(report.actions.capabilities.invalid.is_empty());
    assert!(report.actions.actions.invalid.is_empty());

    let doc = generate_openapi(&catalog);
    assert_eq!(doc.operation("/v1/thing", "get").unwrap().summary, "act1");
    assert_eq!(doc.operation("/v1/charges", "post").unwrap().summary, "Create charge");
    Ok(())
}

#[test]
fn dangling_capability_is_reported() -> Result<()> {
    let dir = invalid_root()?;
    let catalog = IndexRoot::open(dir.path().to_path_buf())?.load()?;
    let report = validate_actions(&catalog);
    assert!(!report.valid);
    assert_eq!(report.actions.invalid.len(), 1);
    let entry = &report.actions.invalid[0];
    assert_eq!(entry.id, "act2");
    assert!(entry.errors.iter().any(|e| e.contains("missing-cap")));
    assert!(!validate_all(&catalog).valid);
    Ok(())
}

#[test]
fn filters_resolve_numeric_and_labelled_tiers() -> Result<()> {
    let dir = fixture_root()?;
    let catalog = IndexRoot::open(dir.path().to_path_buf())?.load()?;
    for label in ["1", "tier1", "tier_1"] {
        let repos = filter_repos(
            &catalog,
            &RepoFilter {
                tier: Some(Tier::parse(label)),
                ..Default::default()
            },
        );
        assert_eq!(repos.len(), 1, "tier {label}");
        assert_eq!(repos[0].id.as_str(), "svc2");
    }
    let payments = filter_actions(
        &catalog,
        &ActionFilter {
            domain: Some("payments".into()),
            ..Default::default()
        },
    );
    let ids: Vec<_> = payments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["charge.create", "cap1.mirror"]);
    Ok(())
}

#[test]
fn service_graph_from_fixture() -> Result<()> {
    let dir = fixture_root()?;
    let catalog = IndexRoot::open(dir.path().to_path_buf())?.load()?;
    let graph = generate_service_graph(&catalog, &RepoFilter::default());
    let edges: Vec<_> = graph
        .edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str(), e.kind))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("svc2", "svc1", EdgeKind::DependsOn),
            ("svc1", "svc2", EdgeKind::ExposesAction),
        ]
    );
    let mermaid = graph_to_mermaid(&graph);
    assert!(mermaid.contains("    n1[\"Billing (svc2)\"]\n"));
    assert!(mermaid.contains("    n1 --> n0\n"));
    assert!(mermaid.contains("    n0 -->|exposes_action| n1\n"));
    Ok(())
}

#[test]
fn capability_index_from_fixture() -> Result<()> {
    let dir = fixture_root()?;
    let catalog = IndexRoot::open(dir.path().to_path_buf())?.load()?;
    let index = generate_capability_index(&catalog);
    assert_eq!(
        index[&CapabilityId::from("cap1")],
        vec![RepoId::from("svc1"), RepoId::from("svc2")]
    );
    assert_eq!(
        index[&CapabilityId::from("billing.charge")],
        vec![RepoId::from("svc2")]
    );
    Ok(())
}

#[test]
fn schema_violation_fails_the_whole_load() -> Result<()> {
    let dir = catalog_root("repos:\n  - id: svc1\n    stage: two\n", ACTIONS_YML)?;
    let err = IndexRoot::open(dir.path().to_path_buf())?.load().unwrap_err();
    match err {
        CatalogError::Schema { violations, .. } => {
            assert!(violations.iter().any(|v| v.starts_with("/repos/0/stage")));
        }
        other => panic!("expected schema error, got {other}"),
    }
    Ok(())
}

#[test]
fn config_file_relocates_documents_and_output() -> Result<()> {
    let dir = fixture_root()?;
    let catalog_dir = dir.path().join("catalog");
    fs::create_dir_all(&catalog_dir)?;
    fs::rename(dir.path().join("repos.yml"), catalog_dir.join("repos.yml"))?;
    fs::rename(dir.path().join("actions.yml"), catalog_dir.join("actions.yml"))?;
    fs::write(
        dir.path().join("index.toml"),
        "[catalog]\nrepos = \"catalog/repos.yml\"\nactions = \"catalog/actions.yml\"\n\n[generate]\noutput_dir = \"out\"\n\n[openapi]\ntitle = \"Fixture API\"\n",
    )?;

    let nested = dir.path().join("docs").join("adr");
    fs::create_dir_all(&nested)?;
    assert_eq!(
        fs::canonicalize(discover_root(None, &nested))?,
        fs::canonicalize(dir.path())?
    );

    let root = IndexRoot::open(dir.path().to_path_buf())?;
    let catalog = root.load()?;
    let written = write_openapi(&catalog, &root.config, &root.output_dir(), None)?;
    assert_eq!(written.path, dir.path().join("out").join("openapi-actions.json"));
    let body: Value = serde_json::from_str(&fs::read_to_string(&written.path)?)?;
    assert_eq!(body["info"]["title"], "Fixture API");
    assert_eq!(
        body["components"]["schemas"]["ChargeInput"]["type"],
        "object"
    );

    let graphs = write_graphs(&catalog, &RepoFilter::default(), &root.output_dir())?;
    assert!(graphs.dot.ends_with("service-graph.dot"));
    assert!(fs::read_to_string(&graphs.dot)?.starts_with("digraph services {"));
    Ok(())
}

#[test]
fn cli_lists_repos_as_json() -> Result<()> {
    let dir = fixture_root()?;
    let output = run_command(cli(
        dir.path(),
        &["repos", "list", "--domain", "payments", "--format", "json"],
    ))?;
    let repos: Value = serde_json::from_str(&stdout(&output))?;
    let repos = repos.as_array().unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0]["id"], "svc2");
    assert_eq!(repos[0]["tier"], "tier_1");
    Ok(())
}

#[test]
fn cli_table_and_aliases() -> Result<()> {
    let dir = fixture_root()?;
    let output = run_command(cli(dir.path(), &["caps", "list"]))?;
    let text = stdout(&output);
    assert!(text.contains("billing.charge"));
    assert!(text.contains("Total: 2 capabilities"));

    let output = run_command(cli(dir.path(), &["actions", "show", "act1", "-f", "json"]))?;
    let action: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(action["http"]["path"], "/v1/thing");
    Ok(())
}

#[test]
fn cli_show_missing_entity_fails() -> Result<()> {
    let dir = fixture_root()?;
    let output = run_command_expect_failure(cli(dir.path(), &["repos", "show", "nope"]))?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Repository 'nope' not found"));
    Ok(())
}

#[test]
fn cli_validate_exit_codes() -> Result<()> {
    let good = fixture_root()?;
    let output = run_command(cli(good.path(), &["validate", "all"]))?;
    assert!(stdout(&output).contains("OK: All configurations are valid"));

    let bad = invalid_root()?;
    let output = run_command_expect_failure(cli(bad.path(), &["validate", "actions"]))?;
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("act2:"));
    assert!(text.contains("capability_id 'missing-cap' does not exist"));

    let output = run_command_expect_failure(cli(
        bad.path(),
        &["validate", "all", "--format", "json"],
    ))?;
    let report: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(report["valid"], false);
    assert_eq!(report["repos"]["totalRepos"], 2);
    Ok(())
}

#[test]
fn cli_generate_writes_artifacts() -> Result<()> {
    let dir = fixture_root()?;
    let output = run_command(cli(dir.path(), &["gen", "openapi", "-o", "api.json"]))?;
    assert!(stdout(&output).contains("Paths: 3"));
    let spec = dir.path().join("generated").join("api.json");
    let body: Value = serde_json::from_str(&fs::read_to_string(spec)?)?;
    assert_eq!(body["openapi"], "3.1.0");

    let output = run_command(cli(
        dir.path(),
        &["generate", "graph", "--domain", "core"],
    ))?;
    assert!(stdout(&output).contains("1 nodes, 0 edges"));
    let mermaid = fs::read_to_string(dir.path().join("generated").join("service-graph.mmd"))?;
    assert_eq!(mermaid, "flowchart LR\n    n0[\"svc1\"]\n");

    let output = run_command(cli(dir.path(), &["gen", "capability-index"]))?;
    assert!(stdout(&output).contains("2 capabilities"));
    let index: Value = serde_json::from_str(&fs::read_to_string(
        dir.path().join("generated").join("capability-index.json"),
    )?)?;
    assert_eq!(index["cap1"], serde_json::json!(["svc1", "svc2"]));
    Ok(())
}

#[test]
fn cli_load_failure_is_fatal() -> Result<()> {
    let dir = catalog_root("repos: [\n", ACTIONS_YML)?;
    let output = run_command_expect_failure(cli(dir.path(), &["repos", "list"]))?;
    assert!(stderr(&output).contains("failed to load catalog"));
    Ok(())
}
