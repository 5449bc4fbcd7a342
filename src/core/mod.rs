pub mod db;
pub mod errors;
pub mod helpers;
pub mod static_server;
