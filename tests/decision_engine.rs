//! End-to-end behavior of the decision engine.

use std::sync::Arc;

use proxy_selector::config::parse_snapshot;
use proxy_selector::routing::{
    resolve_decision, resolve_profile, Decision, DecisionEngine, DecisionSource, ProxyType,
};
use proxy_selector::snapshot::{Rule, Snapshot};

mod common;
use common::{layered_snapshot, GROUP, TAB, URL};

#[test]
fn test_precedence_tab_group_rule_default() {
    let engine = DecisionEngine::new();

    let snapshot = layered_snapshot();
    assert_eq!(engine.evaluate(&snapshot, TAB, Some(GROUP), URL), Decision::profile("tab-proxy"));

    let snapshot = snapshot.without_tab_override(TAB);
    assert_eq!(engine.evaluate(&snapshot, TAB, Some(GROUP), URL), Decision::profile("group-proxy"));

    let snapshot = snapshot.without_group_override(GROUP);
    assert_eq!(engine.evaluate(&snapshot, TAB, Some(GROUP), URL), Decision::profile("rule-proxy"));

    let snapshot = Snapshot {
        rules: Vec::new(),
        ..snapshot
    };
    assert_eq!(engine.evaluate(&snapshot, TAB, Some(GROUP), URL), Decision::Direct);
}

#[test]
fn test_first_match_wins_regardless_of_later_targets() {
    let engine = DecisionEngine::new();
    let snapshot = Snapshot::new()
        .with_rule(Rule::new("first", "*/dashboard", "alpha"))
        .with_rule(Rule::new("second", "*.example.com", "beta"))
        .with_rule(Rule::new("third", "re:example", "gamma"));

    let eval = engine.explain(&snapshot, 1, None, URL);
    assert_eq!(eval.decision, Decision::profile("alpha"));
    assert_eq!(eval.source, DecisionSource::Rule { rule_id: "first".into() });
}

#[test]
fn test_disabled_rule_never_matches() {
    let engine = DecisionEngine::new();
    let snapshot = Snapshot::new()
        .with_rule(Rule::new("off", "*.example.com", "alpha").disabled())
        .with_rule(Rule::new("on", "app.example.com", "beta"));
    assert_eq!(engine.evaluate(&snapshot, 1, None, URL), Decision::profile("beta"));

    let snapshot = Snapshot::new().with_rule(Rule::new("off", "*.example.com", "alpha").disabled());
    assert_eq!(engine.evaluate(&snapshot, 1, None, URL), Decision::Direct);
}

#[test]
fn test_wildcard_and_regex_dialects() {
    let engine = DecisionEngine::new();
    let snapshot = Snapshot::new()
        .with_rule(Rule::new("host", "*.example.com", "host"))
        .with_rule(Rule::new("path", "*/admin/*", "path"))
        .with_rule(Rule::new("regex", r"re:^https://.*\.internal$", "regex"));

    let decide = |url: &str| engine.evaluate(&snapshot, 1, None, url);

    assert_eq!(decide("https://foo.example.com/path"), Decision::profile("host"));
    assert_eq!(decide("https://example.com.evil.test/"), Decision::Direct);
    assert_eq!(decide("https://other.test/admin/panel"), Decision::profile("path"));
    assert_eq!(decide("https://svc.internal"), Decision::profile("regex"));
    assert_eq!(decide("http://svc.internal"), Decision::Direct);
}

#[test]
fn test_repeated_compile_is_idempotent() {
    let engine = DecisionEngine::new();
    let snapshot = Snapshot::new().with_rule(Rule::new("r", "*.example.com", "p"));
    let urls = [
        "https://a.example.com/",
        "https://example.org/",
        "not a url",
        "https://b.example.com/x",
    ];
    let decide = |u: &&str| engine.evaluate(&snapshot, 1, None, u);

    let before: Vec<Decision> = urls.iter().map(decide).collect();
    assert!(engine.patterns().compile("*.example.com").is_some());
    assert!(engine.patterns().compile(" *.example.com ").is_some());
    let after: Vec<Decision> = urls.iter().map(decide).collect();

    assert_eq!(before, after);
    assert_eq!(engine.patterns().len(), 1);
}

#[test]
fn test_dangling_reference_resolves_direct() {
    let engine = DecisionEngine::new();
    let snapshot = Snapshot::new().with_rule(Rule::new("r", "*", "deleted-profile"));

    let decision = engine.evaluate(&snapshot, 1, None, URL);
    assert_eq!(decision, Decision::profile("deleted-profile"));

    let proxy = resolve_decision(&snapshot, &decision);
    assert_eq!(proxy.proxy_type, ProxyType::Direct);
    assert!(resolve_profile(&snapshot, "deleted-profile").is_direct());
}

#[test]
fn test_malformed_url_yields_direct_default() {
    let engine = DecisionEngine::new();
    let snapshot = layered_snapshot()
        .without_tab_override(TAB)
        .without_group_override(GROUP);
    assert_eq!(engine.evaluate(&snapshot, TAB, Some(GROUP), "not a url"), Decision::Direct);
    assert_eq!(engine.evaluate(&snapshot, TAB, Some(GROUP), ""), Decision::Direct);
}

#[test]
fn test_concurrent_evaluation_over_shared_snapshot() {
    let engine = Arc::new(DecisionEngine::new());
    let snapshot = Arc::new(layered_snapshot().without_tab_override(TAB));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            let snapshot = snapshot.clone();
            std::thread::spawn(move || {
                let group = if i % 2 == 0 { Some(GROUP) } else { None };
                engine.evaluate(&snapshot, TAB, group, URL)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = if i % 2 == 0 { "group-proxy" } else { "rule-proxy" };
        assert_eq!(handle.join().unwrap(), Decision::profile(expected));
    }
}

#[test]
fn test_persisted_document_round_trip_through_engine() {
    let snapshot = parse_snapshot(
        r#"{
            "schemaVersion": 1,
            "profiles": {
                "tor": {"id": "tor", "scheme": "socks5", "host": "127.0.0.1", "port": 9050}
            },
            "rules": [
                {"id": "r1", "pattern": "*.onion", "profileId": "tor"},
                {"id": "r2", "pattern": "*", "profileId": "direct", "enabled": false}
            ],
            "tabOverrides": {"3": {"disabled": true}},
            "groupOverrides": {}
        }"#,
    )
    .unwrap();
    let engine = DecisionEngine::new();

    let decision = engine.evaluate(&snapshot, 5, None, "http://hidden.onion/");
    let proxy = resolve_decision(&snapshot, &decision);
    assert_eq!(proxy.proxy_type, ProxyType::Socks);
    assert!(proxy.proxy_dns);
    assert_eq!(proxy.port, 9050);

    assert_eq!(engine.evaluate(&snapshot, 3, None, "http://hidden.onion/"), Decision::Direct);
}
