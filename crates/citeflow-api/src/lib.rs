pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod routes;
pub mod state;

pub use routes::build_router;
