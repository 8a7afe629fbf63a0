//! # Patient Registry
//!
//! REST backend over a relational model of patients, symptoms, diseases and
//! the relationships between them, plus a pass-through endpoint to an
//! external prediction service.
//!
//! ## Architecture
//!
//! - [`api`]: Typed identifiers and the public domain types
//! - [`models`]: Entities, write payloads, pagination and date handling
//! - [`db`]: Repository traits, Postgres and in-memory backends, service layer
//! - [`prediction`]: Client for the prediction service
//! - [`config`]: Server configuration
//! - [`http`]: Axum router and handlers

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod prediction;

#[cfg(feature = "http-server")]
pub mod http;
