//! Driver behaviour: discovery, per-template isolation, and the run loop.

mod common;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use common::{at, write_template, MemoryGateway};
use sleepwalk::common::TemplateName;
use sleepwalk::config::SleepwalkConfig;
use sleepwalk::engine::SleepwalkEngine;
use sleepwalk::error::{ParseErrorKind, TemplateError};
use sleepwalk::events::EngineEvent;
use sleepwalk::time::FixedClock;
use tempfile::TempDir;

fn engine(dir: &Path, gateway: MemoryGateway) -> SleepwalkEngine<MemoryGateway, FixedClock<Utc>> {
    let config = SleepwalkConfig {
        templates: dir.to_path_buf(),
        ..SleepwalkConfig::default()
    };
    SleepwalkEngine::new(config, gateway, FixedClock::new(at(10, 0)))
}

#[tokio::test]
async fn should_apply_valid_templates_and_skip_broken_ones() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "a_good.conf", "09:00-17:00\n{\"persistent\":{\"a\":\"1\"}}\n");
    write_template(
        dir.path(),
        "b_broken.conf",
        "09:00-17:00\n{\"persistent\":{\"b\":\"1\"}}\n09:00-17:00\nnot-json\n",
    );
    write_template(dir.path(), "notes.txt", "09:00-17:00\n{\"ignored\":true}\n");

    let engine = engine(dir.path(), MemoryGateway::with_state("{}"));
    let report = engine.run_once().await.unwrap();

    assert_eq!(report.reports.len(), 1);
    assert_eq!(report.reports[0].template, TemplateName::new("a_good.conf"));
    assert_eq!(report.skipped.len(), 1);

    let skipped = &report.skipped[0];
    assert_eq!(skipped.template, TemplateName::new("b_broken.conf"));
    match &skipped.error {
        TemplateError::Parse(err) => {
            assert_eq!(err.line, 4);
            assert!(matches!(err.kind, ParseErrorKind::InvalidValue(_)));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }

    // The valid first pair of the broken template is not applied.
    assert_eq!(engine.gateway().pushes(), vec![r#"{"persistent":{"a":"1"}}"#]);
}

#[tokio::test]
async fn should_skip_template_removed_after_discovery() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "gone.conf", "09:00-17:00\n{\"a\":1}\n");
    write_template(dir.path(), "kept.conf", "09:00-17:00\n{\"b\":2}\n");

    let engine = engine(dir.path(), MemoryGateway::with_state("{}"));
    let templates = engine.discover().await.unwrap();
    std::fs::remove_file(dir.path().join("gone.conf")).unwrap();

    let report = engine.run_pass(&templates).await;

    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].error, TemplateError::Read { .. }));
    assert_eq!(engine.gateway().pushes(), vec![r#"{"b":2}"#]);
}

#[tokio::test]
async fn should_reparse_templates_on_every_pass() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "live.conf", "09:00-17:00\n{\"v\":1}\n");

    let engine = engine(dir.path(), MemoryGateway::with_state("{}"));
    let templates = engine.discover().await.unwrap();

    let first = engine.run_pass(&templates).await;
    write_template(dir.path(), "live.conf", "09:00-17:00\n{\"v\":2}\n");
    let second = engine.run_pass(&templates).await;

    assert_eq!(first.pass, 1);
    assert_eq!(second.pass, 2);
    assert_eq!(engine.gateway().pushes(), vec![r#"{"v":1}"#, r#"{"v":2}"#]);
}

#[tokio::test]
async fn should_summarize_pass() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "day.conf", "09:00-17:00\n{\"a\":1}\n99:00-17:00\n{}\n");
    write_template(dir.path(), "night.conf", "23:00-01:00\n{\"b\":2}\n");
    write_template(dir.path(), "odd.conf", "09:00-17:00\n");

    let engine = engine(dir.path(), MemoryGateway::with_state("{}"));
    let summary = engine.run_once().await.unwrap().summary();

    assert_eq!(summary.pass, 1);
    assert_eq!(summary.templates, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.failures, 1);
}

#[tokio::test]
async fn should_run_one_pass_at_startup_and_stop_on_shutdown() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "day.conf", "09:00-17:00\n{\"a\":1}\n");
    write_template(dir.path(), "broken.conf", "9:00-17:00\n{}\n");

    let engine = engine(dir.path(), MemoryGateway::with_state("{}"));
    let mut events = engine.subscribe_events();

    engine
        .run_until(tokio::time::sleep(Duration::from_millis(50)))
        .await
        .unwrap();

    assert_eq!(engine.gateway().pushes().len(), 1);
    assert_eq!(
        events.recv().await.unwrap(),
        EngineEvent::EngineStarted { templates: 2 }
    );
    assert!(matches!(
        events.recv().await.unwrap(),
        EngineEvent::TemplateSkipped { pass: 1, .. }
    ));
    match events.recv().await.unwrap() {
        EngineEvent::PassCompleted(summary) => {
            assert_eq!(summary.pass, 1);
            assert_eq!(summary.applied, 1);
            assert_eq!(summary.skipped, 1);
        }
        other => panic!("expected PassCompleted, got {other:?}"),
    }
    assert_eq!(events.recv().await.unwrap(), EngineEvent::EngineShutdown);
}

#[tokio::test]
async fn should_repeat_passes_over_startup_templates_on_every_tick() {
    let dir = TempDir::new().unwrap();
    write_template(dir.path(), "day.conf", "09:00-17:00\n{\"a\":1}\n");

    let config = SleepwalkConfig {
        templates: dir.path().to_path_buf(),
        interval: 1,
        ..SleepwalkConfig::default()
    };
    let engine = SleepwalkEngine::new(
        config,
        MemoryGateway::with_state("{}"),
        FixedClock::new(at(10, 0)),
    );
    let mut events = engine.subscribe_events();

    let late_dir = dir.path().to_path_buf();
    engine
        .run_until(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            write_template(&late_dir, "late.conf", "09:00-17:00\n{\"late\":1}\n");
            tokio::time::sleep(Duration::from_millis(2200)).await;
        })
        .await
        .unwrap();

    let mut passes = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::PassCompleted(summary) = event {
            assert_eq!(summary.templates, 1);
            passes.push(summary.pass);
        }
    }

    assert_eq!(passes, vec![1, 2, 3]);
    assert_eq!(
        engine.gateway().pushes(),
        vec![r#"{"a":1}"#, r#"{"a":1}"#, r#"{"a":1}"#]
    );
}

#[tokio::test]
async fn should_fail_to_start_without_template_directory() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir.path().join("missing"), MemoryGateway::with_state("{}"));

    let result = engine.run_until(std::future::pending()).await;

    assert!(result.is_err());
    assert!(engine.gateway().pushes().is_empty());
}
