//! Data models for expense documents, parsed receipts and configuration.

pub mod config;
pub mod expense;
pub mod provenance;
pub mod receipt;
