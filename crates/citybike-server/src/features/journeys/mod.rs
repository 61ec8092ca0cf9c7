//! Journey listing feature

pub mod queries;
pub mod routes;
