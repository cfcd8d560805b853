//! Error types for every stage of a reconciliation pass.
//!
//! Each error is scoped to the boundary that catches it: a `ParseError` voids
//! one template, a `WindowError` one setting, a `GatewayError` one gateway
//! call. Only `DiscoveryError` and `ConfigError` are allowed to stop the
//! process, and only at startup.

use crate::common::{ClockTime, TemplateName};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// A template failed validation. The whole template is rejected.
#[derive(Debug, Error)]
#[error("template parsing error from {template}:{line}: {kind}")]
pub struct ParseError {
    pub template: TemplateName,
    /// 1-based physical line in the template source.
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Why a template line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("time range `{0}` is not of the form HH:MM-HH:MM")]
    MalformedTimeRange(String),

    #[error("setting is not a JSON object: {0}")]
    InvalidValue(String),

    #[error("time range has no setting line following it")]
    UnpairedLine,
}

/// A setting's window could not be placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("{0} is not a valid time of day")]
    InvalidClockTime(ClockTime),

    #[error("{time} does not exist on {date} in the local timezone")]
    NonexistentLocalTime { time: ClockTime, date: NaiveDate },

    #[error("date out of range next to {0}")]
    DateOutOfRange(NaiveDate),
}

/// A fetch or push against the settings endpoint failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// A discovered template could not be turned into settings for this pass.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template error: cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The template directory itself could not be listed.
#[derive(Debug, Error)]
#[error("cannot list templates in {path}: {source}")]
pub struct DiscoveryError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Startup configuration is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),

    #[error("interval must be at least one second")]
    ZeroInterval,

    #[error("request timeout must be at least one second")]
    ZeroTimeout,

    #[error("address `{0}` is not an http(s) URL")]
    InvalidAddress(String),
}
