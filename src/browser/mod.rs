pub mod driver;
pub mod error;
pub mod locator;
pub mod script;
pub mod session;
