// Request extractors shared by the handlers

pub mod access;
pub mod auth;

pub use access::Access;
pub use auth::AuthUser;
