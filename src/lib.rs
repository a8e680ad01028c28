pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod maintenance;
pub mod present;
pub mod scan;
pub mod server;
pub mod upstream;

mod utils;

pub use error::LintBaseError;
