pub mod buttons;
pub mod discovery;
pub mod filler;
pub mod navigator;
pub mod retry;
pub mod state;
pub mod validation;
