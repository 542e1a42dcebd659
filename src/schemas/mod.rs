pub mod common;
pub mod health;
