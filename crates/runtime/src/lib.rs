#![deny(clippy::all, clippy::pedantic)]
//! # Lanyard Runtime
//!
//! Headless driver for a [`lanyard::Scene`]: loads a record feed, hangs one
//! card per record, optionally scripts a drag gesture and steps a fixed
//! number of frames while logging where the cards end up.

pub mod app;

pub use app::{run, Args, RunSummary};
