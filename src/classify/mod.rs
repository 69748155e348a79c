pub mod advisor;
pub mod field_type;
pub mod patterns;
pub mod registry;
