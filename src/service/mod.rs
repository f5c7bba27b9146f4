pub mod auth;
pub mod dashboard;
pub mod diet;
pub mod doctor;
pub mod geo;
pub mod share;
