//! External profile provider integrations.

pub mod services {
    pub use crate::services::*;
}

pub mod normalizers {
    pub use crate::normalizers::*;
}
