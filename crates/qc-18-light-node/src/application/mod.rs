//! # Application Layer
//!
//! The [`LightNode`] coordinator, protocol result handlers and listener
//! dispatch.

mod handlers;
pub mod listeners;
pub mod node;
mod state;

pub use listeners::ListenerRegistry;
pub use node::LightNode;
