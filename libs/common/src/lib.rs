//! Common library for the tubelift application
//!
//! This crate provides the pieces shared by the API service and the pruning
//! job: database connectivity, error handling, the domain models, and the
//! record store that owns all persisted library data.

pub mod database;
pub mod error;
pub mod models;
pub mod store;
