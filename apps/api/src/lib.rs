//! TeamHub API Library
//!
//! Teams, squads, invitations, news and projects for a member
//! organization: domain rules, PostgreSQL repositories, local image
//! storage and the axum HTTP layer.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
