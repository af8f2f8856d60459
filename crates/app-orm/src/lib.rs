//! `SeaORM` entities for the profile-hub database.

pub mod prelude;

pub mod profiles;
