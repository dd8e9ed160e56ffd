//! Configuration system.
//!
//! Consolidates configuration from four tiers with field-by-field YAML merging:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/taskflow/config.yaml`
//! 3. **User** - `~/.taskflow/config.yaml`
//! 4. **Environment** - variables below
//!
//! ## Environment Variables
//! - `TASKFLOW_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `TASKFLOW_DB_PATH` - Database path
//! - `TASKFLOW_HOST` / `TASKFLOW_PORT` - HTTP listener
//! - `TASKFLOW_USER_DIR` - User config dir (default: `~/.taskflow`)
//! - `TASKFLOW_PROJECT_DIR` - Project config dir (default: `./taskflow`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, EnvOverrides};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
