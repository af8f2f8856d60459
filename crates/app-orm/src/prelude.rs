pub use super::profiles::Entity as Profiles;
