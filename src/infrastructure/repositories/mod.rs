//! Repository Implementations
//!
//! Implementations of the domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgMessageRepository** - Room history in PostgreSQL
//! - **InMemoryMessageRepository** - Room history kept in process memory
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use babel_chat::domain::MessageRepository;
//! use babel_chat::infrastructure::repositories::PgMessageRepository;
//!
//! let store: Arc<dyn MessageRepository> = Arc::new(PgMessageRepository::new(pool));
//! ```

pub mod memory_repository;
pub mod message_repository;

pub use memory_repository::InMemoryMessageRepository;
pub use message_repository::PgMessageRepository;
