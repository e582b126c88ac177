// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod errors;
pub mod invitation;
pub mod membership;
pub mod news;
pub mod permissions;
pub mod project;
pub mod repositories;
pub mod roles;
pub mod squad;
pub mod team;
pub mod user;

pub use errors::DomainError;
