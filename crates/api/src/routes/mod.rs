//! API route handlers

pub mod ingest;
pub mod stations;
