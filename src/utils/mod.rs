pub mod api_response;
pub mod auth_errors;
