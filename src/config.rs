//! Container configuration
//!
//! Tuning knobs for bucket accounting and for the failure policy of bulk
//! updates.

use crate::error::{Error, Result};

/// Configuration for a [`crate::Hashmap`] instance.
#[derive(Debug, Clone, PartialEq)]
pub struct HashmapConfig {
    /// Entries per bucket before the bucket count doubles
    pub max_load_factor: f64,

    /// Apply `set_values` all-or-nothing instead of element by element
    pub atomic_updates: bool,

    /// Lower bound for the bucket count
    pub min_buckets: usize,
}

impl Default for HashmapConfig {
    fn default() -> Self {
        Self {
            max_load_factor: 1.0,
            atomic_updates: false,
            min_buckets: 8,
        }
    }
}

impl HashmapConfig {
    /// Reject partially applied bulk updates
    pub fn atomic() -> Self {
        Self {
            atomic_updates: true,
            ..Default::default()
        }
    }

    /// Fewer, fuller buckets
    pub fn compact() -> Self {
        Self {
            max_load_factor: 4.0,
            min_buckets: 1,
            ..Default::default()
        }
    }

    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    pub fn with_atomic_updates(mut self, atomic: bool) -> Self {
        self.atomic_updates = atomic;
        self
    }

    pub fn with_min_buckets(mut self, min_buckets: usize) -> Self {
        self.min_buckets = min_buckets;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max_load_factor must be finite and positive, got {}",
                self.max_load_factor
            )));
        }
        if self.min_buckets == 0 {
            return Err(Error::InvalidConfig(
                "min_buckets must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
