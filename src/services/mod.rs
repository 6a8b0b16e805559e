//! Business logic services
//!
//! Stateless operations used by the update handlers. None of them touch the
//! model directly, so they can be tested without a running surface.

pub mod keys;
pub mod log_buffer;
pub mod pairing;
pub mod scan;
