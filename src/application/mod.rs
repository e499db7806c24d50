// Application layer
// Use cases composed from the domain policy, validation and repository ports

pub mod bootstrap;
pub mod directory_service;

pub use directory_service::{TeamDetails, TeamDirectoryService, TeamFilter};
