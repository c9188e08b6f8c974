//! Human readable names for identifiers, used in errors and logs only.

use crate::identifier::Identifier;

/// Name shown for identifiers created without one
pub const UNNAMED: &str = "unnamed";

/// Debug name of an identifier
pub fn token_name(identifier: &Identifier) -> &str {
    identifier.name().unwrap_or(UNNAMED)
}

/// `Container(a,b)` - named after the dependencies the reference guarantees
pub(crate) fn container_ref_name(deps: &[Identifier]) -> String {
    let names: Vec<&str> = deps.iter().map(token_name).collect();
    format!("Container({})", names.join(","))
}

/// `"a"->"b"->"a"`
pub(crate) fn chain_name(chain: &[String]) -> String {
    let quoted: Vec<String> = chain.iter().map(|name| format!("\"{name}\"")).collect();
    quoted.join("->")
}
