//! Almanac HTTP server: routing, middleware and error rendering.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
pub mod middleware;
