//! Warta - Indonesian news article collector and analytics
//!
//! This crate fetches article metadata from a fixed set of JSON feed
//! endpoints on a schedule, keeps only the latest snapshot in SQLite, and
//! serves filtering, aggregation, and title word-frequency queries over it
//! as a small JSON API.

pub mod analytics;
pub mod article;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod routes;
pub mod scheduler;
pub mod store;
pub mod text;
