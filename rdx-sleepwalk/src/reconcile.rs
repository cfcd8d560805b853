//! Applies the active settings of one template.
//!
//! Every setting whose window contains `now` goes through one apply cycle:
//! fetch the current settings, push the setting's value, fetch again, and
//! compare the two snapshots as opaque strings. Nothing is remembered between
//! calls, so a setting is pushed again on every pass while its window stays
//! open. That is only safe because the settings endpoint replaces the whole
//! document on `PUT`.
//!
//! Failures never escape: a bad window or a failed gateway call is recorded in
//! the [`ReconciliationReport`] and the remaining settings still run.

use crate::common::{ClusterState, TemplateName};
use crate::error::{GatewayError, WindowError};
use crate::gateway::SettingsGateway;
use crate::template::Template;
use crate::window::Window;
use chrono::{DateTime, TimeZone};
use std::fmt;
use tracing::{error, info, warn};

/// Which gateway call of an apply cycle an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStage {
    FetchBefore,
    Push,
    FetchAfter,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchBefore => "fetch before push",
            Self::Push => "push",
            Self::FetchAfter => "fetch after push",
        })
    }
}

/// Whether the cluster's settings observably changed across a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Changed {
        before: ClusterState,
        after: ClusterState,
    },
    Unchanged,
    /// One of the fetches failed, so there is nothing to compare.
    Unknown,
}

/// The result of fetch, push, fetch for one active setting.
///
/// All three calls are attempted even when an earlier one failed.
#[derive(Debug)]
pub struct ApplyCycle {
    pub before: Result<ClusterState, GatewayError>,
    pub acknowledgement: Result<String, GatewayError>,
    pub after: Result<ClusterState, GatewayError>,
}

impl ApplyCycle {
    pub fn change(&self) -> StateChange {
        match (&self.before, &self.after) {
            (Ok(before), Ok(after)) if before != after => StateChange::Changed {
                before: before.clone(),
                after: after.clone(),
            },
            (Ok(_), Ok(_)) => StateChange::Unchanged,
            _ => StateChange::Unknown,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = (ApplyStage, &GatewayError)> {
        [
            (ApplyStage::FetchBefore, self.before.as_ref().err()),
            (ApplyStage::Push, self.acknowledgement.as_ref().err()),
            (ApplyStage::FetchAfter, self.after.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(stage, err)| err.map(|err| (stage, err)))
    }
}

/// What happened to one setting during a pass.
#[derive(Debug)]
pub enum SettingStatus {
    Inactive,
    EvaluationFailed(WindowError),
    Applied(ApplyCycle),
}

#[derive(Debug)]
pub struct SettingOutcome {
    pub line: usize,
    pub window: Window,
    pub status: SettingStatus,
}

/// Per-setting results for one template, in template order.
#[derive(Debug)]
pub struct ReconciliationReport {
    pub template: TemplateName,
    pub outcomes: Vec<SettingOutcome>,
}

impl ReconciliationReport {
    /// Settings whose window was active and which went through an apply cycle.
    pub fn applied(&self) -> impl Iterator<Item = &ApplyCycle> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            SettingStatus::Applied(cycle) => Some(cycle),
            _ => None,
        })
    }

    pub fn applied_count(&self) -> usize {
        self.applied().count()
    }

    /// No window was active. Not an error.
    pub fn nothing_applied(&self) -> bool {
        self.applied_count() == 0
    }

    pub fn evaluation_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, SettingStatus::EvaluationFailed(_)))
            .count()
    }

    pub fn gateway_failures(&self) -> usize {
        self.applied().map(|cycle| cycle.failures().count()).sum()
    }
}

/// Runs one apply cycle for each setting of `template` that is active at `now`.
pub async fn reconcile<G, Tz>(
    gateway: &G,
    template: &Template,
    now: &DateTime<Tz>,
) -> ReconciliationReport
where
    G: SettingsGateway,
    Tz: TimeZone,
    Tz::Offset: Sync,
{
    let name = template.name();
    let mut outcomes = Vec::with_capacity(template.settings().len());

    for setting in template.settings() {
        let status = match setting.window.contains(now) {
            Ok(false) => SettingStatus::Inactive,
            Ok(true) => {
                info!(template = %name, line = setting.line, "Pushing setting from template");
                let cycle = apply(gateway, &setting.value).await;
                log_cycle(name, setting.line, &cycle);
                SettingStatus::Applied(cycle)
            }
            Err(e) => {
                error!(
                    template = %name,
                    line = setting.line,
                    error = %e,
                    "Cannot evaluate window, skipping setting"
                );
                SettingStatus::EvaluationFailed(e)
            }
        };
        outcomes.push(SettingOutcome {
            line: setting.line,
            window: setting.window,
            status,
        });
    }

    let report = ReconciliationReport {
        template: name.clone(),
        outcomes,
    };
    if report.nothing_applied() {
        info!(template = %name, "No settings to apply");
    }
    report
}

async fn apply<G: SettingsGateway>(gateway: &G, value: &str) -> ApplyCycle {
    let before = gateway.fetch().await;
    let acknowledgement = gateway.push(value).await;
    let after = gateway.fetch().await;
    ApplyCycle {
        before,
        acknowledgement,
        after,
    }
}

fn log_cycle(template: &TemplateName, line: usize, cycle: &ApplyCycle) {
    for (stage, err) in cycle.failures() {
        warn!(template = %template, line, stage = %stage, error = %err, "Gateway call failed");
    }
    match cycle.change() {
        StateChange::Changed { before, after } => {
            info!(template = %template, line, "Settings changed from {} to {}", before, after);
        }
        StateChange::Unchanged => info!(template = %template, line, "No settings changed"),
        StateChange::Unknown => {
            warn!(template = %template, line, "Could not tell whether settings changed");
        }
    }
}
