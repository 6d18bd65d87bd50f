//! Contractor-name normalization.
//!
//! Reporting exports prefix contractor names with a 10-digit internal
//! registration code; the same contractor also appears with and without the
//! prefix, so stripping it is what makes the aggregation key collapse both
//! spellings into one letter.

use regex::Regex;

/// Strip a leading 10-digit registration code (and the whitespace after it),
/// trimming the result. Names without the prefix pass through trimmed.
pub fn normalize(raw: &str) -> String {
    let prefix = Regex::new(r"^\d{10}\s*").unwrap();
    prefix.replace(raw, "").trim().to_string()
}

/// Quoted short name of the legal entity, e.g. `ООО "Ромашка"` → `Ромашка`.
///
/// Patterns are tried in fixed priority: full LLC form, abbreviated LLC,
/// full JSC, abbreviated JSC, full closed JSC, abbreviated closed JSC. When
/// none match, the input comes back unchanged.
pub fn short_name(name: &str) -> String {
    let patterns = [
        r#"(?i)Общество с ограниченной ответственностью\s*"([^"]+)""#,
        r#"(?i)ООО\s*"([^"]+)""#,
        r#"(?i)Акционерное общество\s*"([^"]+)""#,
        r#"(?i)АО\s*"([^"]+)""#,
        r#"(?i)Закрытое акционерное общество\s*"([^"]+)""#,
        r#"(?i)ЗАО\s*"([^"]+)""#,
    ];

    for pattern in patterns {
        let regex = Regex::new(pattern).unwrap();
        if let Some(captures) = regex.captures(name) {
            if let Some(matched) = captures.get(1) {
                return matched.as_str().to_string();
            }
        }
    }

    name.to_string()
}

/// Instrumental-case phrase for the entity's legal form, used in the letter
/// body («заключен договор между X и <формой> "Y"»).
pub fn legal_form(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.contains("ооо") || lower.contains("общество с ограниченной ответственностью") {
        "Обществом с ограниченной ответственностью"
    } else if lower.contains("ао") || lower.contains("акционерное общество") {
        "Акционерным обществом"
    } else if lower.contains("зао") || lower.contains("закрытое акционерное общество") {
        "Закрытым акционерным обществом"
    } else {
        "организацией"
    }
    .to_string()
}
