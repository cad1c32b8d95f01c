//! Outbound adapters satisfying the domain ports.

pub mod persistence;
pub mod security;
