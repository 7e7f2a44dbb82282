//! Configuration merge logic
//!
//! Local config is merged field-by-field over the home config:
//! - Strings: a non-empty local value wins, empty inherits
//! - `upper`: any present local value wins, including `false`
//! - `params`: a non-empty local list REPLACES the home list

use super::file::{non_empty, Config};

fn merge_string(global: &mut Option<String>, local: Option<String>) {
    if non_empty(&local).is_some() {
        *global = local;
    }
}

/// Merge `local` over `global`, returning the effective config.
pub fn merge_config(mut global: Config, local: Config) -> Config {
    merge_string(&mut global.region, local.region);
    merge_string(&mut global.replica, local.replica);
    merge_string(&mut global.prefix, local.prefix);
    merge_string(&mut global.output, local.output);
    merge_string(&mut global.file, local.file);
    merge_string(&mut global.env_prefix, local.env_prefix);
    merge_string(&mut global.role, local.role);
    merge_string(&mut global.kms, local.kms);

    // Presence, not truthiness
    if local.upper.is_some() {
        global.upper = local.upper;
    }

    // Lists: REPLACE (no per-item merge)
    if !local.params.is_empty() {
        global.params = local.params;
    }

    global
}
