//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod scripted_transport;
pub mod socket_guard;
