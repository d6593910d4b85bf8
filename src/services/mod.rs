pub mod auth_service;
pub mod export;
pub mod list_view;
pub mod request_repository;
