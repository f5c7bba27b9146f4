pub mod activity;
pub mod appointment;
pub mod memory_repository;
pub mod password_reset;
pub mod rate_limit;
pub mod session;
pub mod user;
