//! # Sleepwalk
//!
//! Applies time-windowed settings to a cluster's `/_cluster/settings`
//! endpoint.
//!
//! Sleepwalk reads templates that say "while the clock is between 23:00 and
//! 01:00, the cluster should have these settings", works out which windows
//! are open right now, and pushes the matching values. Each push is
//! bracketed by a fetch of the current settings so the logs show what, if
//! anything, changed.
//!
//! ## Core Concepts
//!
//! - **Template**: a `.conf` file of alternating `HH:MM-HH:MM` lines and JSON
//!   setting lines. A template is accepted or rejected as a whole.
//! - **Window**: a clock-time interval, possibly crossing midnight, with
//!   exclusive boundaries.
//! - **Pass**: one evaluation of every discovered template against a single
//!   reference instant. Passes run on a fixed interval and never overlap.
//! - **Gateway**: the [`SettingsGateway`](gateway::SettingsGateway) seam in
//!   front of the remote cluster.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sleepwalk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create a default configuration.
//!     let config = SleepwalkConfig::default();
//!
//!     // 2. Build the gateway and the clock windows are evaluated against.
//!     let gateway = HttpGateway::from_config(&config)?;
//!     let clock = SystemClock::new(chrono::Local);
//!
//!     // 3. Create the engine.
//!     let engine = SleepwalkEngine::new(config, gateway, clock);
//!
//!     // 4. Run it. It will shut down on Ctrl+C.
//!     engine.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Sleepwalk";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod common;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod reconcile;
pub mod template;
pub mod time;
pub mod window;

/// A prelude module for easy importing of the most common Sleepwalk types.
pub mod prelude {
    pub use crate::common::{ClockTime, ClusterState, TemplateName};
    pub use crate::config::SleepwalkConfig;
    pub use crate::engine::{PassReport, SleepwalkEngine};
    pub use crate::error::{GatewayError, ParseError, TemplateError, WindowError};
    pub use crate::events::{EngineEvent, PassSummary};
    pub use crate::gateway::{HttpGateway, SettingsGateway};
    pub use crate::reconcile::{reconcile, ReconciliationReport, StateChange};
    pub use crate::template::{Setting, Template};
    pub use crate::time::{Clock, FixedClock, SystemClock};
    pub use crate::window::Window;
}
