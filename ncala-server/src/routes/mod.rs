//! HTTP and socket route handlers

pub mod socket;
pub mod status;
