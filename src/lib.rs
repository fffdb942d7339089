//! Ranking and trend views over quarterly SOE reform indicators.
//!
//! Raw spreadsheet rows are normalized into [`types::Observation`]s, filtered
//! to one indicator, ranked at one quarter and followed over a time range,
//! with the same color identity in both views.

pub mod auth;
pub mod boundary;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod ranking;
pub mod region;
pub mod time;
pub mod trend;
pub mod types;
pub mod util;

pub use dashboard::{Dashboard, DashboardView, ViewRequest};
pub use error::{DashboardError, Result};
