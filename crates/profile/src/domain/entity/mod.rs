pub mod profile;
pub mod theme;
