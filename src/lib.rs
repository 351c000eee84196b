//! Library crate for ftp-sweep exposing reusable modules.
pub mod crawler;
pub mod error;
pub mod hosts;
pub mod listing;
pub mod resume;
pub mod scanner;
pub mod session;
pub mod sink;
pub mod types;
