pub mod extract;
pub mod static_user;
pub mod user;
