pub mod config;
pub mod deploy;
pub mod error;
pub mod middleware;
pub mod server;
pub mod storage;

pub use server::Server;
