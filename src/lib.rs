pub mod config;
pub mod output;
pub mod scenario;
pub mod server;
pub mod staffing;
