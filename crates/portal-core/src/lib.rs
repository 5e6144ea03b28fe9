//! Core types and trait definitions for the officer portal.
//!
//! No HTTP or database dependencies live here.
//! Storage backends implement [`store::PortalStore`]; the API layer drives
//! every operation through that trait.

pub mod admin;
pub mod error;
pub mod exam;
pub mod officer;
pub mod store;
pub mod transfer;

pub use error::{Error, Result};
