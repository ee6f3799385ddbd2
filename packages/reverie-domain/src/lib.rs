pub mod caption;
pub mod date_serde;
pub mod memory;
pub mod projection;

pub use memory::{MemoryId, MemoryRecord, NewMemory};
pub use projection::{LayoutProjection, ScrollProgress};
