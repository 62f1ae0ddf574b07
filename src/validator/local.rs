const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

/// Règles strictes: dot-atom ASCII, '.' non initial/terminal, pas de ".."
pub(crate) fn is_local_strict(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    s.split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

/// Règles relaxed: autorise une quoted-string simple (ASCII imprimable, sans
/// guillemet nu), sinon retombe sur `is_local_strict`.
pub(crate) fn is_local_relaxed(s: &str) -> bool {
    match s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner
            .chars()
            .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '"'),
        None => is_local_strict(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn strict_dots() {
        assert!(!is_local_strict(".abc"));
        assert!(!is_local_strict("abc."));
        assert!(!is_local_strict("a..b"));
        assert!(is_local_strict("a.b"));
        assert!(is_local_strict("first+tag"));
    }

    #[test]
    fn strict_rejects_quotes_and_spaces() {
        assert!(!is_local_strict("\"a b\""));
        assert!(!is_local_strict("a b"));
    }

    #[test]
    fn relaxed_quoted() {
        assert!(is_local_relaxed("\"a b\""));
        assert!(!is_local_relaxed("\"a\"b\""));
        assert!(is_local_relaxed("plain.user"));
    }
}
