//! Providers command.

use crate::cli::output;
use crate::core::constants::ENV_FILE;
use crate::core::envfile::EnvFileStore;
use crate::core::provider::ProviderKind;
use crate::error::Result;

/// List providers with their keys; mark the one configured here.
pub fn execute() -> Result<()> {
    let configured = EnvFileStore::current()
        .and_then(|store| store.read(ENV_FILE))
        .ok()
        .and_then(|env| ProviderKind::detect(&env).ok());

    for (i, kind) in ProviderKind::ALL.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let title = format!("{} ({})", kind.display_name(), kind.name());
        if configured == Some(*kind) {
            output::header(&format!("{}  [configured]", title));
        } else {
            output::header(&title);
        }
        output::kv("marker:  ", output::key(kind.marker_key()));
        output::kv("required:", kind.required_keys().join(", "));
        if !kind.optional_keys().is_empty() {
            output::kv("optional:", kind.optional_keys().join(", "));
        }
    }
    Ok(())
}
