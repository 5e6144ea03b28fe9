//! [`Portal`]: the portal operations, generic over the store backend.
//!
//! Operations live next to their handlers (`admin`, `officers`,
//! `subscription`, `results`, `transfers`), each adding an `impl` block here.

use std::sync::Arc;

use portal_core::{store::PortalStore, transfer::DesignationSet};

/// Entry point for every portal operation. Cheap to clone.
pub struct Portal<S> {
  store:        Arc<S>,
  designations: Arc<DesignationSet>,
}

impl<S> Clone for Portal<S> {
  fn clone(&self) -> Self {
    Self {
      store:        Arc::clone(&self.store),
      designations: Arc::clone(&self.designations),
    }
  }
}

impl<S: PortalStore> Portal<S> {
  pub fn new(store: Arc<S>, designations: DesignationSet) -> Self {
    Self { store, designations: Arc::new(designations) }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn designations(&self) -> &DesignationSet { &self.designations }
}
