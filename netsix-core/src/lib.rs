//! Netsix Core Library
//!
//! This crate provides the shared types, buffers, and collaborator traits
//! that tie the netsix user-space IPv6 stack together. Protocol engines and
//! link adapters in the sibling crates build on these seams and own no
//! shared state of their own.

pub mod buffer;
pub mod error;
pub mod route;
pub mod stack;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use buffer::RecvBuffer;
pub use error::{Error, Result};
pub use route::{PacketParams, ReplyRouteBuilder, Route, DEFAULT_TRAFFIC_CLASS, DEFAULT_TTL};
pub use stack::{
    ControlKind, LinkAddressResolver, LinkEndpoint, NudController, ReachabilityConfirmation,
    StackContext, TentativeStatus, TransportDispatcher,
};
pub use stats::Counter;
pub use types::{LinkAddr, NicId};
