//! Station list and statistics feature

pub mod queries;
pub mod routes;
