// Authentication primitives: access tokens and password hashes

pub mod jwt;
pub mod password;
