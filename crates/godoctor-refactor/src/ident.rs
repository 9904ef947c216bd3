/// Identifier-grammar validity used by every refactoring that accepts a user-supplied
/// name (§4.6 Rename's "validate the new name").
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if unicode_ident::is_xid_start(c) || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| unicode_ident::is_xid_continue(c))
}
