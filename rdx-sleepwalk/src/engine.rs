//! The driver that discovers templates and reconciles them on a fixed tick.

use crate::common::TemplateName;
use crate::config::SleepwalkConfig;
use crate::discovery::discover_templates;
use crate::error::{DiscoveryError, TemplateError};
use crate::events::{EngineEvent, PassSummary};
use crate::gateway::SettingsGateway;
use crate::reconcile::{reconcile, ReconciliationReport};
use crate::template::read_template;
use crate::time::Clock;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// The main sleepwalk engine.
///
/// Holds the startup configuration, the settings gateway and the clock that
/// windows are evaluated against. Passes run strictly one after another; no
/// state survives from one pass to the next apart from the pass counter.
pub struct SleepwalkEngine<G, C> {
    config: Arc<SleepwalkConfig>,
    gateway: Arc<G>,
    clock: Arc<C>,
    event_sender: broadcast::Sender<EngineEvent>,
    passes: Arc<AtomicU64>,
}

impl<G, C> Clone for SleepwalkEngine<G, C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            gateway: self.gateway.clone(),
            clock: self.clock.clone(),
            event_sender: self.event_sender.clone(),
            passes: self.passes.clone(),
        }
    }
}

/// A template that took no part in a pass.
#[derive(Debug)]
pub struct SkippedTemplate {
    pub template: TemplateName,
    pub error: TemplateError,
}

/// Everything one reconciliation pass did.
#[derive(Debug)]
pub struct PassReport {
    pub pass: u64,
    pub reports: Vec<ReconciliationReport>,
    pub skipped: Vec<SkippedTemplate>,
}

impl PassReport {
    pub fn summary(&self) -> PassSummary {
        PassSummary {
            pass: self.pass,
            templates: self.reports.len() + self.skipped.len(),
            skipped: self.skipped.len(),
            applied: self.reports.iter().map(|r| r.applied_count()).sum(),
            failures: self
                .reports
                .iter()
                .map(|r| r.evaluation_failures() + r.gateway_failures())
                .sum(),
        }
    }
}

impl<G, C> SleepwalkEngine<G, C>
where
    G: SettingsGateway,
    C: Clock,
{
    /// Creates a new `SleepwalkEngine`.
    pub fn new(config: SleepwalkConfig, gateway: G, clock: C) -> Self {
        let (event_sender, _) = broadcast::channel(64);
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            clock: Arc::new(clock),
            event_sender,
            passes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &SleepwalkConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Runs until Ctrl+C. See [`run_until`](Self::run_until).
    pub async fn run(&self) -> anyhow::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Discovers templates once, runs a pass immediately, then one pass per
    /// interval until `shutdown` resolves.
    ///
    /// Templates added to the directory after startup are not picked up. A
    /// pass that overruns the interval delays the next tick rather than
    /// overlapping with it. Shutdown is honoured between passes.
    ///
    /// # Errors
    /// Fails only if the template directory cannot be listed at startup.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        info!("SleepwalkEngine starting up...");
        let templates = self.discover().await?;
        self.event_sender
            .send(EngineEvent::EngineStarted {
                templates: templates.len(),
            })
            .ok();

        self.run_pass(&templates).await;

        let period = self.config.interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Engine running every {:?}. Press Ctrl+C to shut down.", period);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.run_pass(&templates).await;
                }
            }
        }

        info!("Shutdown signal received.");
        self.event_sender.send(EngineEvent::EngineShutdown).ok();
        info!("SleepwalkEngine has shut down.");
        Ok(())
    }

    /// Discovers templates and runs exactly one pass.
    pub async fn run_once(&self) -> anyhow::Result<PassReport> {
        let templates = self.discover().await?;
        Ok(self.run_pass(&templates).await)
    }

    pub async fn discover(&self) -> Result<Vec<TemplateName>, DiscoveryError> {
        let templates = discover_templates(&self.config.templates).await?;
        info!(
            dir = %self.config.templates.display(),
            count = templates.len(),
            "Discovered templates"
        );
        Ok(templates)
    }

    /// Reconciles every template against a single reference instant.
    ///
    /// A template that cannot be read or parsed is logged and skipped; the
    /// others still run.
    pub async fn run_pass(&self, templates: &[TemplateName]) -> PassReport {
        let pass = self.passes.fetch_add(1, Ordering::Relaxed) + 1;
        let now = self.clock.now();
        info!(pass, templates = templates.len(), "Starting reconciliation pass");

        let mut reports = Vec::with_capacity(templates.len());
        let mut skipped = Vec::new();
        for name in templates {
            info!(template = %name, "Reading template");
            match read_template(&self.config.templates, name).await {
                Ok(template) => reports.push(reconcile(&*self.gateway, &template, &now).await),
                Err(e) => {
                    error!(template = %name, error = %e, "Skipping template for this pass");
                    self.event_sender
                        .send(EngineEvent::TemplateSkipped {
                            pass,
                            template: name.clone(),
                            reason: e.to_string(),
                        })
                        .ok();
                    skipped.push(SkippedTemplate {
                        template: name.clone(),
                        error: e,
                    });
                }
            }
        }

        let report = PassReport {
            pass,
            reports,
            skipped,
        };
        let summary = report.summary();
        info!(
            pass,
            applied = summary.applied,
            skipped = summary.skipped,
            failures = summary.failures,
            "Reconciliation pass complete"
        );
        self.event_sender
            .send(EngineEvent::PassCompleted(summary))
            .ok();
        report
    }

    /// Subscribes to the `EngineEvent` stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_sender.subscribe()
    }
}
