//! HTTP inbound adapter exposing the REST endpoints.

pub mod error;
pub mod factories;
pub mod factories_dto;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
