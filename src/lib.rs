// src/lib.rs

//! Driver for the Aeroqual SM70 ozone sensor's half-duplex serial protocol.
//!
//! The SM70 speaks a fixed-layout binary request/response protocol at 4800
//! baud over a shared half-duplex line. This crate provides the protocol
//! engine only: the wire codec for the four message layouts, a
//! fixed-capacity request pool/queue, and the cooperative turnaround state
//! machine that sequences send → drain → receive → validate for each
//! request. The physical transport and the polling scheduler are supplied
//! by the caller through the [`common::Sm70Serial`] and
//! [`common::Sm70Clock`] traits.

#![no_std]

pub mod common;
pub mod engine;

// Re-export key types for convenience
pub use common::{Sm70Clock, Sm70Error, Sm70Serial, WireError};
pub use engine::{DoneFn, RequestHandle, RequestKind, Sm70, State};
