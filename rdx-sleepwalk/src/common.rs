//! Contains common, primitive types shared by the parser, evaluator and engine.
//!
//! Using distinct types for template names and clock times keeps them from
//! being confused with arbitrary strings and integers as they flow through a
//! reconciliation pass.

use std::fmt;

/// The suffix a file name must carry to be treated as a template.
pub const TEMPLATE_SUFFIX: &str = ".conf";

/// Identifies a template by its file name inside the template directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateName(String);

impl TemplateName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wall-clock `HH:MM` as written in a template.
///
/// Both components are two decimal digits, so each lies in `0..=99`. Whether
/// they form a real time of day is only checked when the window is placed on
/// a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// An opaque snapshot of the remote cluster's settings.
///
/// Only ever compared for equality; the body is never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterState(String);

impl ClusterState {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
