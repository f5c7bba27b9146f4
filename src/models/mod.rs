pub mod activity;
pub mod dashboard;
pub mod diet;
pub mod doctor;
pub mod password_reset;
pub mod rate_limit;
pub mod session;
pub mod user;
