//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM.
//! - **memory**: in-process repository for development without a database
//!   and for tests.
//!
//! Adapters only translate between domain types and storage
//! representations.

pub mod memory;
pub mod persistence;
