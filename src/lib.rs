//! # Wedsite Library
//!
//! Multi-tenant wedding websites: host-based tenant resolution, guest and
//! event management, and RSVP tracking with statistics and exports.

pub mod auth;
pub mod config;
pub mod db;
pub mod domains;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routing;
pub mod rsvp;
pub mod server;
pub mod telemetry;
pub use migration;
