//! Core Kernel - Foundational types and utilities for the claims tracker
//!
//! This crate provides the building blocks shared by every other crate:
//! - Sequential, human-readable identifier codes (`CL00001`, `CLM000001`)
//!   and the per-client-per-day client reference
//! - Amount helpers with precise decimal arithmetic
//! - Clock and date formatting helpers
//! - Port error type and marker traits for the ports-and-adapters layout

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::MoneyError;
pub use temporal::{Clock, SystemClock, FixedClock, Timezone, TemporalError};
pub use identifiers::{
    ClientId, ShipmentId, UserId,
    ClientCode, ClaimCode, ClientReference, SequenceKind, AllocationError,
    sanitize_client_name,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
