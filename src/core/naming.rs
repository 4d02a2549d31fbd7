//! core::naming
//!
//! Case-insensitive naming rules for commands, record types, fields and
//! identity keys.
//!
//! # Rules
//!
//! - Names compare case-insensitively (`Language`, `language`, `LANGUAGE`)
//! - Lookup tables key on the folded form returned by [`fold`]
//! - The `add` action is reserved and cannot name a custom command

/// The reserved action token for create-or-update commands.
pub const ADD_ACTION: &str = "add";

/// Fold a name into its lookup-table key.
///
/// # Example
///
/// ```
/// use seedline::core::naming::fold;
///
/// assert_eq!(fold("NativeName"), "nativename");
/// assert_eq!(fold("ÉCOLE"), "école");
/// ```
pub fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Compare two names case-insensitively.
///
/// # Example
///
/// ```
/// use seedline::core::naming::eq_ignore_case;
///
/// assert!(eq_ignore_case("en", "EN"));
/// assert!(eq_ignore_case("Straße", "STRAßE"));
/// assert!(!eq_ignore_case("en", "es"));
/// ```
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || (!a.is_ascii() && fold(a) == fold(b))
}

/// Whether `name` is the reserved `add` action.
pub fn is_reserved(name: &str) -> bool {
    eq_ignore_case(name, ADD_ACTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_add_in_any_case() {
        assert!(is_reserved("add"));
        assert!(is_reserved("ADD"));
        assert!(is_reserved("Add"));
        assert!(!is_reserved("adder"));
    }

    #[test]
    fn fold_is_stable() {
        assert_eq!(fold(&fold("MiXeD")), fold("MiXeD"));
    }

    #[test]
    fn ascii_fast_path_rejects_different_lengths() {
        assert!(!eq_ignore_case("en", "eng"));
    }
}
