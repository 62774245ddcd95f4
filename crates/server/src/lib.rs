pub mod auth_client;
pub mod errors;
pub mod extract;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;

pub use routes::{build_auth_router, build_content_router};
pub use startup::{run_auth, run_content};
