const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Vérifie la partie domaine après conversion IDNA et ajoute chaque problème
/// trouvé à `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    let Ok(ascii) = idna::domain_to_ascii(domain) else {
        reasons.push("domain punycode conversion failed".to_string());
        return;
    };
    if ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return;
    }

    if ascii.len() > MAX_DOMAIN_LEN {
        reasons.push(format!("domain length {} > {MAX_DOMAIN_LEN}", ascii.len()));
    }
    if !ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }
    reasons.extend(ascii.split('.').filter_map(label_problem));
}

fn label_problem(label: &str) -> Option<String> {
    if label.is_empty() {
        return Some("empty domain label".to_string());
    }
    if label.len() > MAX_LABEL_LEN {
        return Some(format!(
            "domain label '{label}' length {} > {MAX_LABEL_LEN}",
            label.len()
        ));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Some(format!("domain label '{label}' starts or ends with '-'"));
    }
    if let Some(bad) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
        return Some(format!("domain label '{label}' contains {bad:?}"));
    }
    None
}

/// (domaine en minuscules sans point final, forme ASCII). La forme ASCII est
/// vide si la conversion IDNA échoue.
pub(crate) fn normalize_domain(domain: &str) -> (String, String) {
    let lower = domain.trim().trim_end_matches('.').to_lowercase();
    let ascii = idna::domain_to_ascii(&lower).unwrap_or_default();
    (lower, ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problems(domain: &str) -> Vec<String> {
        let mut reasons = Vec::new();
        check_domain(domain, &mut reasons);
        reasons
    }

    #[test]
    fn plain_and_idn_domains_pass() {
        assert!(problems("example.com").is_empty());
        assert!(problems("mail.exämple.co.uk").is_empty());
    }

    #[test]
    fn oversized_label() {
        let reasons = problems(&format!("{}.com", "a".repeat(64)));
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("> 63"));
    }

    #[test]
    fn hyphen_at_label_edge() {
        let reasons = problems("-mail.example.com");
        assert!(reasons.iter().any(|r| r.contains("starts or ends with '-'")));
    }

    #[test]
    fn underscore_is_not_ldh() {
        let reasons = problems("mail_relay.example.com");
        assert!(reasons.iter().any(|r| r.contains("'_'")), "{reasons:?}");
    }

    #[test]
    fn empty_label_between_dots() {
        assert!(problems("example..com").iter().any(|r| r == "empty domain label"));
    }

    #[test]
    fn normalize_lowercases_and_punycodes() {
        let (lower, ascii) = normalize_domain("ExÄmple.COM.");
        assert_eq!(lower, "exämple.com");
        assert_eq!(ascii, "xn--exmple-cua.com");
    }
}
