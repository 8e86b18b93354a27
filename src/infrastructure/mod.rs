//! Infrastructure layer - Store clients, backend adapters and services

pub mod backend;
pub mod logging;
pub mod observability;
pub mod services;
pub mod store;
