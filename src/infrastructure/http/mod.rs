//! HTTP Layer - RESTful API
//!
//! 同步合成、异步任务、Provider 与健康检查接口

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{build_router, HttpServer};
pub use state::{AppState, StateSettings};
