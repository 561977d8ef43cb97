//! # Ports Module
//!
//! Hexagonal architecture ports (inbound results, outbound collaborators).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
