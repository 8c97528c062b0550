//! Adapters that connect the engine to the outside world.

pub mod broadcast_listener;

pub use broadcast_listener::BroadcastListener;
