pub mod dto;
pub mod handlers;
pub mod number;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use handlers::routes as router;
