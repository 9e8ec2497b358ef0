//! Typed wrappers over the REST methods, one service per API area.
//!
//! Every service borrows the shared [`Core`](crate::core::Core) and maps
//! its replies into the DTOs defined next to it.

pub mod crm;
pub mod event;
pub mod im;
pub mod main;
pub mod placement;
pub mod telephony;
pub mod user;
