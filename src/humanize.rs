//! Business vocabulary used when turning raw keys into display text.
//!
//! Every exception to the generic rule lives in one of the tables below. The
//! generic rule splits a key on `_`, `-` and whitespace and title-cases each
//! word.

/// Section titles that do not follow the generic rule.
pub const SECTION_TITLES: &[(&str, &str)] = &[
    ("parties", "Parties"),
    ("premises", "Premises"),
    ("lease_term", "Lease Term"),
    ("rent", "Rent & Revenue"),
    ("charges", "Charges & CAM"),
    ("deposits", "Deposits"),
    ("legal", "Legal & Escalation"),
    ("franchise", "Franchise Details"),
];

/// Words rendered in a fixed spelling wherever they appear in a label.
pub const WORD_FIXUPS: &[(&str, &str)] = &[
    ("cam", "CAM"),
    ("hvac", "HVAC"),
    ("loi", "LOI"),
    ("cin", "CIN"),
    ("tds", "TDS"),
    ("mglr", "MGLR"),
    ("kw", "kW"),
    ("id", "ID"),
    ("gst", "GST"),
    ("noc", "NOC"),
    ("fssai", "FSSAI"),
    ("cto", "CTO"),
    ("cte", "CTE"),
    ("fofo", "FOFO"),
    ("foco", "FOCO"),
    ("coco", "COCO"),
];

/// Unit markers rewritten when they are the last word of a label.
pub const TRAILING_UNIT_FIXUPS: &[(&str, &str)] = &[("sqft", "(sq ft)"), ("pct", "(%)")];

/// Display labels for the collaborator's document classes.
pub const DOCUMENT_TYPE_LABELS: &[(&str, &str)] = &[
    ("lease_loi", "Lease / LOI"),
    ("license_certificate", "License Certificate"),
    ("franchise_agreement", "Franchise Agreement"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, label)| *label)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Humanizes a raw key: `base_rent` becomes `Base Rent`,
/// `super_area_sqft` becomes `Super Area (sq ft)`.
pub fn humanize_key(key: &str) -> String {
    let words: Vec<&str> = key
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .collect();

    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(index, word)| {
            let lower = word.to_lowercase();
            if index == last && index > 0 {
                if let Some(unit) = lookup(TRAILING_UNIT_FIXUPS, &lower) {
                    return unit.to_string();
                }
            }
            match lookup(WORD_FIXUPS, &lower) {
                Some(fixed) => fixed.to_string(),
                None => title_case(word),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title for a section key, honouring [`SECTION_TITLES`] first.
pub fn section_title(key: &str) -> String {
    lookup(SECTION_TITLES, key)
        .map(str::to_string)
        .unwrap_or_else(|| humanize_key(key))
}

/// Label for a document class, honouring [`DOCUMENT_TYPE_LABELS`] first.
pub fn document_type_label(document_type: &str) -> String {
    lookup(DOCUMENT_TYPE_LABELS, document_type)
        .map(str::to_string)
        .unwrap_or_else(|| humanize_key(document_type))
}

/// Formats a rupee amount with Indian digit grouping (`₹1,20,000`).
///
/// Fractional paise are kept to two places only when present.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let paise = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if negative { "-" } else { "" };
    if paise > 0 {
        format!("{sign}₹{grouped}.{paise:02}")
    } else {
        format!("{sign}₹{grouped}")
    }
}
