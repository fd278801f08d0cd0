//! desklog - two-sink logging for desktop applications
//!
//! Rotating daily log files plus a filtered console, with platform data
//! directories, first-run file seeding and localized messages around it.

pub mod app_data;
pub mod config;
pub mod logging;
pub mod messages;
