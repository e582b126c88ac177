// User domain module
// Profiles are the application-level record behind an authenticated identity

pub mod display;
pub mod profile;
pub mod value_objects;

pub use display::{first_last_name, initials};
pub use profile::{Profile, ProfileDetails};
pub use value_objects::Email;
