// Provenance filter for definition sites

use crate::parser::{SourceLocation, SyntaxUnit};

/// True when `location` belongs to the unit's own main file: not in a system
/// header, in the main file, and resolvable to a named file.
pub fn is_in_scope<U: SyntaxUnit + ?Sized>(location: SourceLocation, unit: &U) -> bool {
    if unit.is_in_system_header(location) {
        return false;
    }
    if !unit.is_from_main_file(location) {
        return false;
    }
    !unit.presumed_location(location).file.is_empty()
}
