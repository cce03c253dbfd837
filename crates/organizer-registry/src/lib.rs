//! # organizer-registry — Organization Lifecycle
//!
//! Owns every organization's approver set, quorum threshold and status.
//!
//! ```text
//! Unregistered ──onboard──▶ Active ──offboard──▶ Offboarded
//!                             ▲  │                   │
//!                             │  └─modify_approvers  │
//!                             └──────── onboard ─────┘
//! ```
//!
//! Re-onboarding an offboarded organization behaves like a fresh
//! onboarding; its audit history is kept.
//!
//! ## Crate Policy
//!
//! - [`OrganizationRegistry`] is an explicit keyed store. Callers own it
//!   and pass it by reference; there is no global instance.
//! - Every mutation validates the full new state before applying it, so a
//!   failed call leaves the organization untouched.

pub mod error;
pub mod organization;
pub mod registry;

pub use error::RegistryError;
pub use organization::{OrgStatus, Organization, RegistryEvent, RegistryRecord};
pub use registry::OrganizationRegistry;
