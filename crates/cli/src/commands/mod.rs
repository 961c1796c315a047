//! CLI command implementations.

pub mod config_cmd;
pub mod replay;
pub mod turn;

use toron_context::ContextBundle;

/// Print one bundle as a JSON document on stdout.
pub fn emit(bundle: &ContextBundle, pretty: bool) -> Result<(), toron_core::Error> {
    let json = if pretty {
        serde_json::to_string_pretty(bundle)?
    } else {
        serde_json::to_string(bundle)?
    };
    println!("{json}");
    Ok(())
}
