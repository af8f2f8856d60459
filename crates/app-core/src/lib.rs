//! Shared infrastructure for the profile-hub service.

pub mod config;
pub mod error;
pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod rejection;
pub mod response;
pub mod storage;
pub mod time;
