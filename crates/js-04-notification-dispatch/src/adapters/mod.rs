//! In-process adapters for the outbound ports.

pub mod alerts;
pub mod directory;
pub mod memory;

pub use alerts::TracingAlertSink;
pub use directory::StaticDirectory;
pub use memory::MemoryChannel;
