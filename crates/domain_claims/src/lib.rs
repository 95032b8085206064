//! Claims Tracking Domain
//!
//! Clients, claims ("shipments") and everything that happens when one is
//! saved: sequential identifier allocation, per-client-per-day references,
//! savings and settlement derivation. Also hosts list filters, bulk import
//! row parsing and dashboard aggregation.
//!
//! # Save pipeline
//!
//! ```text
//! form / import row -> validate -> get-or-create client
//!     -> store.save_claim [ allocate claim_id -> allocate reference
//!                           -> derive savings -> derive settlement -> write ]
//! ```

pub mod allocator;
pub mod analytics;
pub mod claim;
pub mod client;
pub mod error;
pub mod filter;
pub mod import;
pub mod maintainer;
pub mod memory;
pub mod ports;
pub mod service;
pub mod users;
pub mod validation;

pub use allocator::AllocationScope;
pub use analytics::AnalyticsReport;
pub use claim::{Branch, Claim, ClaimForm, ClaimRecord, ClaimStatus, SettlementStatus};
pub use client::{Client, ClientSuggestion};
pub use error::ClaimError;
pub use filter::ClaimFilter;
pub use import::{ImportReport, SheetCell};
pub use maintainer::{DerivedFieldMaintainer, ZeroPaidPolicy};
pub use memory::InMemoryClaimStore;
pub use ports::{ClaimStore, UserStore};
pub use service::{ClaimService, ClientDeletion, CreatedClaim};
pub use users::{NewUser, User};
pub use validation::{ClaimRules, FieldError, ValidationResult};
