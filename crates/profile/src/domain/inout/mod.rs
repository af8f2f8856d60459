pub mod profile;
pub mod session;

pub mod prelude {
    pub use super::profile::*;
    pub use super::session::*;
}
