//! # Domain Entities
//!
//! Core domain entities representing the business objects the relay persists.
//!
//! ## Core Entities
//!
//! - **Message**: A chat message stored in a room's history
//!
//! Rooms and sessions are not entities: a room is only a key of the live
//! session registry, and sessions exist only while a connection is open.
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod message;

pub use message::{Message, MessageRepository, NewMessage};

#[cfg(test)]
pub use message::MockMessageRepository;
