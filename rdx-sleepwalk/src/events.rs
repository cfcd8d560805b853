//! Defines the events broadcast by the sleepwalk engine.
//!
//! Subscribers receive a cheap, cloneable summary of what each pass did. The
//! full per-setting detail stays in the `PassReport` returned by
//! `SleepwalkEngine::run_pass`.

use crate::common::TemplateName;

/// Events related to the lifecycle of the engine and its passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Fired once after startup discovery, before the first pass.
    EngineStarted { templates: usize },
    /// Fired when a template could not be read or parsed during a pass.
    TemplateSkipped {
        pass: u64,
        template: TemplateName,
        reason: String,
    },
    /// Fired at the end of every pass.
    PassCompleted(PassSummary),
    /// Fired once when the run loop is about to exit.
    EngineShutdown,
}

/// Counts describing one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// 1-based sequence number of the pass since the engine was created.
    pub pass: u64,
    pub templates: usize,
    pub skipped: usize,
    /// Apply cycles run, i.e. settings whose window was active.
    pub applied: usize,
    /// Window evaluation and gateway failures combined.
    pub failures: usize,
}
