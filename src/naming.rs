//! Registry identifiers derived from class names
//!
//! `Billing::InvoiceLine` becomes `billing.invoice_line`; Rust type paths
//! such as `my_app::money::Money<u64>` become `my_app.money.money`.

use std::sync::OnceLock;

use regex::Regex;

fn acronym_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex"))
}

fn word_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"))
}

/// Underscore a single CamelCase segment: `HTTPServer` -> `http_server`
pub fn underscore(segment: &str) -> String {
    let step = acronym_boundary().replace_all(segment, "${1}_${2}");
    let step = word_boundary().replace_all(&step, "${1}_${2}");
    step.replace('-', "_").to_lowercase()
}

/// Registry key for a class or type path
pub fn identifier(class_name: &str) -> String {
    let path = class_name
        .split_once('<')
        .map_or(class_name, |(base, _)| base);

    path.split("::")
        .flat_map(|part| part.split('/'))
        .filter(|part| !part.is_empty())
        .map(underscore)
        .collect::<Vec<_>>()
        .join(".")
}
