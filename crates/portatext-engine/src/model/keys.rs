use uuid::Uuid;

/// Generate an opaque key for a block, span, or mark definition.
///
/// Keys are assigned once at creation time and never reassigned; the
/// parser carries the previous block's key through every re-parse.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }

    #[test]
    fn keys_are_plain_identifiers() {
        let key = generate();
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
