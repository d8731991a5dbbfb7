pub mod analyses;
pub mod sessions;
pub mod users;
