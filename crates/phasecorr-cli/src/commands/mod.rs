pub mod config;
pub mod register;
pub mod shift;
