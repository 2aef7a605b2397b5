//! Engine configuration from TOML (`[engine]` section)

use serde::{Deserialize, Serialize};
use tandem_application::EngineConfig;

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Refuse creator votes in the final poll round
    pub block_creator_in_final_round: bool,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            block_creator_in_final_round: EngineConfig::default().block_creator_in_final_round,
        }
    }
}

impl FileEngineConfig {
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            block_creator_in_final_round: self.block_creator_in_final_round,
        }
    }
}
