//! Construction estimation service: quantity takeoff, brand enrichment,
//! AI location pricing and currency normalization behind an axum API.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod estimation;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
