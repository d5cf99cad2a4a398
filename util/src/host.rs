//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "TITO_SW_ROOT";

/// Get the path to the software root directory.
///
/// The root contains the `params` and `sessions` directories.
pub fn get_tito_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
