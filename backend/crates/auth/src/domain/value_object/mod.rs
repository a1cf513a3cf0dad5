//! Value Object Module

pub mod credentials;
pub mod user_name;
pub mod user_password;

pub use credentials::Credentials;
pub use user_name::{UserName, UserNameError};
pub use user_password::{RawPassword, UserPassword};
