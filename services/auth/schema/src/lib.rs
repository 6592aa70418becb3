pub mod auth_requests;
pub mod users;
