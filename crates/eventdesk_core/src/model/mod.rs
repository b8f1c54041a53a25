//! Event and attendee domain model.
//!
//! # Responsibility
//! - Define the records shared by repositories, services and front ends.
//! - Own the validation rules that run before any store mutation.
//!
//! # Invariants
//! - Event times are UTC instants; the source timezone code is kept only
//!   for redisplay.
//! - `attendee_count` is derived on read and never persisted.

pub mod attendee;
pub mod event;
