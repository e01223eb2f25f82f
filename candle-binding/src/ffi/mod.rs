//! # FFI (Foreign Function Interface) Module

pub mod classify; //  classification functions
pub mod init; //  initialization functions
pub mod memory; //  memory management functions
pub mod types; //  C structure definitions

// Re-export types and functions
pub use classify::*;
pub use init::*;
pub use memory::*;
pub use types::*;

#[cfg(test)]
pub mod init_test;
