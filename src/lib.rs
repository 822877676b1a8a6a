//! quakewatch: Earthquake feed monitor with regional push alerts
//!
//! This library provides the core components for:
//! - Fetching and normalizing events from the USGS earthquake catalog
//! - Polling loops with fixed-interval and exponential-backoff policies
//! - A subscriber registry with validated registration intake
//! - Per-subscriber alert evaluation with a dedup watermark
//! - Batched push notification dispatch through an Expo-style gateway
//! - Structured logging and Prometheus metrics

pub mod alert;
pub mod cli;
pub mod config;
pub mod feed;
pub mod poll;
pub mod push;
pub mod registry;
pub mod telemetry;
