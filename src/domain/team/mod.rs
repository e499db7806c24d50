// Team domain module
// Contains the team aggregate root, its members, value objects and events

#![allow(clippy::module_inception)]

pub mod events;
pub mod member;
pub mod team;
pub mod value_objects;

pub use events::TeamEvent;
pub use member::Member;
pub use team::Team;
pub use value_objects::{MaxSize, MemberRole, TeamCode, TeamField};
