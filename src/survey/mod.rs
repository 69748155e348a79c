pub mod capture;
pub mod model;
pub mod raw;
pub mod scanner;
pub mod selectors;
