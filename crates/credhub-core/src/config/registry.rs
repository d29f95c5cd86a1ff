//! Subject registry configuration.

use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::shortid;

/// Settings for subject registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Length of generated short identifiers (7–10).
    #[serde(default = "default_id_length")]
    pub id_length: usize,
}

impl RegistryConfig {
    /// Generates one subject identifier of the configured length.
    pub fn new_subject_id(&self) -> AppResult<String> {
        shortid::generate(self.id_length)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            id_length: default_id_length(),
        }
    }
}

fn default_id_length() -> usize {
    10
}
