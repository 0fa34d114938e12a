//! Type aliases for domain concepts.

use std::collections::BTreeMap;

/// A variable name (e.g., DATABASE_URL, API_KEY).
pub type VarName = String;

/// Parsed contents of one `.env`-style file.
///
/// Keys are case-sensitive and iterate in sorted order.
pub type EnvMap = BTreeMap<VarName, String>;

/// Provider-specific stable identifier of a remote secret.
pub type SecretId = String;
