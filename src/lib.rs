//! wpswatch — quality-of-service monitor for WPS (Web Processing Service)
//! endpoints.
//!
//! Probes configured processes on their own schedules, records every outcome
//! (a down endpoint is data, not an error), publishes lifecycle signals on an
//! in-process event bus, and computes response-time statistics over the
//! recorded history.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
