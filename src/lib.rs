//! Keygrid - access-key backend for the signals panel
//!
//! This library provides the core functionality for the keygrid backend:
//! key issuance and validation, mobile-money payment integration, signal
//! grid generation, and the affiliate page micro-CMS.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod plans;
pub mod rate_limit;
pub mod signal;
