//! API endpoint handlers, one module per resource.

pub mod analysis;
pub mod auth;
pub mod community;
pub mod health;
pub mod hypotheses;
pub mod labs;
pub mod logs;
pub mod medical_tests;
