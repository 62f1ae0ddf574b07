//! Local format pre-check. Nothing in here touches the network.

mod domain;
mod local;
mod types;

pub use types::{NormalizedEmail, ValidationMode, ValidationReport};

use once_cell::sync::Lazy;
use regex::Regex;

use domain::{check_domain, normalize_domain};
use local::{is_local_relaxed, is_local_strict};

/// Forme minimale: une partie locale, un seul '@', un point dans le domaine.
static SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("address shape pattern failed to compile. This is a bug.")
});

pub fn validate_email(email: &str, mode: ValidationMode) -> ValidationReport {
    let input = email.trim();

    let mut reasons = Vec::new();

    if input.is_empty() {
        reasons.push("address is empty".to_string());
        return ValidationReport { ok: false, reasons };
    }

    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    let Some((local, domain)) = input.split_once('@') else {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport { ok: false, reasons };
    };
    if domain.contains('@') && !local.starts_with('"') {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport { ok: false, reasons };
    }

    if !local.starts_with('"') && !SHAPE.is_match(input) {
        reasons.push("address does not match local@domain.tld".to_string());
    }

    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
    }

    check_domain(domain, &mut reasons);

    let local_ok = match mode {
        ValidationMode::Strict => is_local_strict(local),
        ValidationMode::Relaxed => is_local_relaxed(local),
    };
    if !local_ok {
        reasons.push(match mode {
            ValidationMode::Strict => "invalid local part (strict rules)".into(),
            ValidationMode::Relaxed => "invalid local part (relaxed rules)".into(),
        });
    }

    let ok = reasons.is_empty();
    ValidationReport { ok, reasons }
}

/// Valide et renvoie une sortie normalisée (local, domaine normalisé,
/// domaine ASCII).
pub fn normalize_email(email: &str, mode: ValidationMode) -> NormalizedEmail {
    let input = email.trim();
    // décomposer tôt (même si invalide) pour normaliser ce qu'on peut
    let (local, domain) = input.split_once('@').unwrap_or(("", ""));

    let ValidationReport { ok, reasons } = validate_email(email, mode);
    let (domain_lower, ascii_domain) = normalize_domain(domain);

    NormalizedEmail {
        original: email.to_string(),
        local: local.to_string(),
        domain: domain_lower,
        ascii_domain,
        mode,
        valid: ok,
        reasons,
    }
}
