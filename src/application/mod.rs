pub mod errors;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

// Re-exports
pub use server::{ServerConfig, serve};
