// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod department;
pub mod errors;
pub mod policy;
pub mod repositories;
pub mod team;
pub mod user;
pub mod validation;

pub use errors::{ConflictKind, DomainError, DomainResult};
