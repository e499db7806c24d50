//! Team Directory API Library
//!
//! Team-membership access control for an HR platform: a role-based policy
//! evaluator, a team mutation validator, and the directory service and HTTP
//! adapters built around them.

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
