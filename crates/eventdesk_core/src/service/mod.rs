//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Run validation before any store mutation.
//! - Keep front ends decoupled from storage details.

pub mod attendee_service;
pub mod event_service;
pub mod registration;
