pub mod auth;
pub mod email;
pub mod error;
pub mod models;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
