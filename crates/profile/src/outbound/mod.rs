pub mod orm;
pub mod repository;
pub mod session;
