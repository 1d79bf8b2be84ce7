//! Core traits for r53sync
//!
//! This module defines the backend interfaces the engine is written against.
//!
//! - [`InstanceInventory`]: Query running instances by filter and region
//! - [`DnsProvider`]: Submit a batch of record-set changes to a hosted zone
//! - [`ObjectStore`]: Fetch/store a resource definition at a remote location

pub mod instance_inventory;
pub mod dns_provider;
pub mod object_store;

pub use instance_inventory::{Instance, InstanceInventory, Reservation};
pub use dns_provider::{ChangeInfo, DnsProvider};
pub use object_store::ObjectStore;
