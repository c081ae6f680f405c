use serde::{Deserialize, Serialize};

/// `modules.catalog` configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// bcrypt work factor (4..=31)
    pub bcrypt_cost: u32,
    pub max_query_depth: usize,
    pub max_query_complexity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 10,
            max_query_depth: 16,
            max_query_complexity: 2000,
        }
    }
}
