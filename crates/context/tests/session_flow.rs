//! End-to-end session tests for the context mediator.
//!
//! Every test drives a full mediator with a manual clock, so timestamps and
//! decay are deterministic.

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use toron_config::{AppConfig, ClassifierConfig, WindowConfig};
use toron_context::{
    ActivityState, AdaptiveResponseEngine, BackendSignal, ContextMediator, ConversationPhase,
    IntentClassification, Persona,
};
use toron_core::{Intent, ManualClock, Role};

// ── Helpers ──────────────────────────────────────────────────────────────

fn mediator_with(config: AppConfig) -> (ContextMediator, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_epoch());
    (ContextMediator::with_clock(&config, clock.clone()), clock)
}

fn mediator() -> (ContextMediator, Arc<ManualClock>) {
    mediator_with(AppConfig::default())
}

fn json(mediator: &ContextMediator) -> String {
    serde_json::to_string(&mediator.get_context_metadata()).unwrap()
}

/// Walk every number in a serialized bundle and check its range.
fn assert_numbers_in_range(value: &Value, key: &str) {
    match value {
        Value::Number(n) => {
            let v = n.as_f64().unwrap();
            match key {
                "window_size" => assert!(v >= 0.0),
                "sentiment" => assert!((-1.0..=1.0).contains(&v), "sentiment {v}"),
                _ => assert!((0.0..=1.0).contains(&v), "{key} = {v}"),
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                assert_numbers_in_range(v, k);
            }
        }
        Value::Array(items) => {
            for item in items {
                assert_numbers_in_range(item, key);
            }
        }
        _ => {}
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[test]
fn rollout_request_on_fresh_session() {
    let (mut m, _) = mediator();
    let bundle = m.begin_turn("Can you help me plan the rollout?");

    assert_eq!(m.session().last_classification.intent, Intent::Planning);
    assert_ne!(bundle.persona.persona, Persona::Companion);
    assert_eq!(bundle.persona.persona, Persona::Strategist);
    assert_eq!(bundle.state.activity, ActivityState::Thinking);
    assert_eq!(bundle.state.phase, ConversationPhase::Exploration);
    assert_eq!(bundle.metadata_for_visualizer.window_size, 1);
}

#[test]
fn window_stays_bounded_and_evicts_oldest() {
    let config = AppConfig {
        window: WindowConfig { max_size: 15 },
        ..AppConfig::default()
    };
    let (mut m, clock) = mediator_with(config);

    for i in 0..16 {
        clock.advance(Duration::seconds(1));
        let bundle = m.begin_turn(&format!("message number {}", "x".repeat(i + 1)));
        assert!(bundle.metadata_for_visualizer.window_size <= 15);
    }

    let window = m.session().window.window();
    assert_eq!(window.len(), 15);
    assert_eq!(window[0].summary, "message number xx");
    assert_eq!(window[14].summary, format!("message number {}", "x".repeat(16)));
    assert!(window.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn personal_data_never_reaches_stored_fields() {
    let (mut m, _) = mediator();
    let bundle = m.begin_turn("contact me at test@example.com, call 5551234");

    let entry = &m.session().window.window()[0];
    assert!(entry.summary.contains("[redacted]"));
    assert!(entry.summary.contains("[num]"));
    assert!(!entry.summary.contains("test@example.com"));
    assert!(!entry.summary.contains("5551234"));

    let serialized = serde_json::to_string(&bundle).unwrap();
    assert!(!serialized.contains("test@example.com"));
    assert!(!serialized.contains("5551234"));
    assert!(!m.session().trace.topic.contains("555"));
}

#[test]
fn assistant_reply_is_scrubbed_too() {
    let (mut m, _) = mediator();
    m.begin_turn("what's the support line?");
    m.update_after_llm("Call 1-800-5550199 or mail help@corp.example");

    let entry = m.session().window.recent(1).next().unwrap().clone();
    assert_eq!(entry.role, Role::Assistant);
    assert_eq!(entry.intent, Intent::Respond);
    assert!(!entry.summary.contains("help@corp.example"));
    assert!(!entry.summary.contains("800"));
    assert!(!entry.summary.contains("5550199"));
}

#[test]
fn hallucination_risk_moves_gradually() {
    let (mut m, _) = mediator();
    m.begin_turn(
        "urgent!!! architect a distributed database migration pipeline with security and \
         performance tradeoffs for the concurrency layer right now",
    );
    let prev = m.session().trace.hallucination_risk;
    let raw = AdaptiveResponseEngine::new()
        .build_adaptive_response(
            &m.session().persona,
            &IntentClassification::respond(),
            &m.session().state,
            None,
        )
        .hallucination_risk;

    let bundle = m.update_after_llm("Here is a staged approach.");
    let after = bundle.metadata_for_visualizer.ambient.hallucination_risk;

    let expected = prev * 0.75 + raw * 0.25;
    assert!((after - expected).abs() < 1e-12, "{after} vs {expected}");
    if (prev - raw).abs() > 1e-9 {
        assert!((after - raw).abs() > 1e-9, "risk jumped straight to the new estimate");
    }
    assert_eq!(after, bundle.metadata_for_visualizer.trace.hallucination_risk);
}

#[test]
fn backend_error_collapses_confidence() {
    let (mut m, _) = mediator();
    let before = m.begin_turn("please help me fix the login bug");
    let pre = before.metadata_for_visualizer.ambient.confidence;

    let failed = m.report_backend_error();
    assert_eq!(failed.state.activity, ActivityState::Error);
    assert_eq!(failed.metadata_for_visualizer.ambient.state, ActivityState::Error);
    assert!(failed.metadata_for_visualizer.ambient.confidence <= pre * 0.3);
    assert_eq!(failed.metadata_for_visualizer.window_size, 1);
}

#[test]
fn error_signal_on_reply_path() {
    let (mut m, _) = mediator();
    m.begin_turn("summarize the meeting notes");
    let bundle = m.update_after_llm_with("", BackendSignal::failure());
    assert_eq!(bundle.state.activity, ActivityState::Error);

    let recovered = m.update_after_llm_with("All good now.", BackendSignal::activity(0.8));
    assert_ne!(recovered.state.activity, ActivityState::Error);
}

#[test]
fn error_only_appears_when_signalled() {
    let (mut m, _) = mediator();
    let inputs = [
        "hi",
        "URGENT!!! everything is broken and I hate this",
        "let's brainstorm",
        "",
        "thanks so much, that was perfect",
    ];
    for text in inputs {
        assert_ne!(m.begin_turn(text).state.activity, ActivityState::Error);
        assert_ne!(m.update_after_llm(text).state.activity, ActivityState::Error);
    }
}

#[test]
fn reset_restores_the_default_bundle() {
    let (fresh, _) = mediator();
    let expected = json(&fresh);

    let (mut m, clock) = mediator();
    m.begin_turn("I'm worried the deploy will fail");
    m.update_after_llm("Let's add a rollback plan.");
    m.report_backend_error();
    clock.advance(Duration::seconds(30));
    m.decay();
    assert_ne!(json(&m), expected);

    m.reset_context();
    assert_eq!(json(&m), expected);
    assert!(m.session().window.is_empty());
}

#[test]
fn identical_sessions_produce_identical_bundles() {
    let script = [
        "Can you help me plan the rollout?",
        "what if we launch in two waves",
        "I'm frustrated, the staging env keeps crashing",
    ];
    let run = || {
        let (mut m, clock) = mediator();
        let mut out = Vec::new();
        for line in script {
            clock.advance(Duration::seconds(5));
            out.push(serde_json::to_string(&m.begin_turn(line)).unwrap());
            out.push(serde_json::to_string(&m.update_after_llm("noted")).unwrap());
        }
        out
    };
    assert_eq!(run(), run());
}

#[test]
fn frustration_selects_empathetic_persona() {
    let (mut m, _) = mediator();
    let bundle = m.begin_turn("this is ridiculous, I'm so frustrated with the build");
    assert_eq!(bundle.persona.persona, Persona::Empathetic);
    assert_eq!(bundle.metadata_for_visualizer.trace.emotion, "frustrated");
}

#[test]
fn every_number_in_every_bundle_is_in_range() {
    let (mut m, clock) = mediator();
    let long = "architecture ".repeat(400);
    let hostile = [
        "",
        "!!!!!!!!!!!!!!!!!!!!",
        "🙂🙃 émoji ünïcode 漢字",
        long.as_str(),
        "urgent asap emergency critical immediately hurry deadline today right now",
    ];
    for text in hostile {
        assert_numbers_in_range(&serde_json::to_value(m.begin_turn(text)).unwrap(), "");
        assert_numbers_in_range(
            &serde_json::to_value(m.update_after_llm_with(text, BackendSignal::activity(f64::NAN)))
                .unwrap(),
            "",
        );
        assert_numbers_in_range(&serde_json::to_value(m.report_backend_error()).unwrap(), "");
        clock.advance(Duration::hours(3));
        assert_numbers_in_range(&serde_json::to_value(m.decay()).unwrap(), "");
    }
}

#[test]
fn analysis_phase_is_reached_by_complex_turns() {
    let (mut m, _) = mediator();
    let bundle = m.begin_turn(
        "We need to plan the database migration strategy for the distributed payments \
         system, including rollout sequencing, security review, performance budgets and \
         integration testing across every regional deployment before the quarter closes",
    );
    assert_eq!(bundle.state.phase, ConversationPhase::Analysis);
    assert!(
        bundle
            .current_context
            .semantic_context
            .contains("phase:analysis")
    );
}

#[test]
fn ambient_activity_matches_state_after_every_entry_point() {
    let (mut m, clock) = mediator();
    let same = |b: &toron_context::ContextBundle| {
        assert_eq!(b.state.activity, b.metadata_for_visualizer.ambient.state);
    };

    same(&m.get_context_metadata());
    same(&m.begin_turn("Can you help me plan the rollout?"));
    same(&m.update_after_llm("Start with a staging deploy."));
    same(&m.update_after_llm_with("More detail.", BackendSignal::activity(0.6)));
    same(&m.report_backend_error());
    clock.advance(Duration::seconds(30));
    same(&m.decay());
    same(&m.begin_turn("trying again"));
    m.reset_context();
    same(&m.get_context_metadata());
}

#[test]
fn inverted_confidence_bounds_do_not_panic() {
    let config = AppConfig {
        classifier: ClassifierConfig {
            min_confidence: 0.8,
            max_confidence: 0.4,
            ..ClassifierConfig::default()
        },
        ..AppConfig::default()
    };
    assert!(config.validate().is_err());

    let (mut m, _) = mediator_with(config);
    let bundle = m.begin_turn("hello");
    assert_eq!(bundle.metadata_for_visualizer.window_size, 1);
    assert_numbers_in_range(&serde_json::to_value(bundle).unwrap(), "");
}
