//! Fixed reserved-word table.

pub const RESERVED: &[&str] = &[
    "if", "else", "while", "for", "break", "continue", "return", "co_return", "yield", "defer",
    "delete", "select", "alias", "struct", "enum", "match", "switch", "let", "async", "await",
    "send", "receive", "interface", "fn", "new", "sizeof", "alignof", "append", "len", "cast",
    "true", "false", "nullptr", "void", "bool", "char", "short", "int", "int64", "int128", "half",
    "float", "double", "auto", "mut", "_",
];

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_and_keywords_are_reserved() {
        assert!(is_reserved("while"));
        assert!(is_reserved("int128"));
        assert!(is_reserved("_"));
        assert!(!is_reserved("my_identifier"));
    }
}
