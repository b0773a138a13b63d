#![forbid(unsafe_code)]

//! Finds high-traffic YouTube tags for a topic.
//!
//! A query is searched on the YouTube Data API, the matching videos' tags are
//! aggregated and ranked by the views behind them, and the most-viewed videos
//! are surfaced alongside as title inspiration. The `backend` binary wraps
//! this in a small web form.

pub mod config;
pub mod error;
pub mod insights;
pub mod tags;
pub mod view;
pub mod viral;
pub mod youtube;

pub use error::{Error, Result};
