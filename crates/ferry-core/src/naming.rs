//! Naming convention shared by projection and relationship lookup.

use crate::resource::Deployable;

/// Generate-name prefix for projections of `deployable`.
///
/// Written into a new projection's `generate_name` and used later to
/// recognize that projection in a snapshot. Prefixes are not unique across
/// unrelated Deployables, so matching must also check annotations.
pub fn generated_name_prefix(deployable: &Deployable) -> String {
    match deployable.metadata.generate_name.as_deref() {
        Some(generate_name) if !generate_name.is_empty() => format!("{}-", generate_name),
        _ => format!("{}-", deployable.metadata.name),
    }
}
