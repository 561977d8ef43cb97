//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for embedding applications.

mod channel_listener;

pub use channel_listener::ChannelListener;
