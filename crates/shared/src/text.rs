//! Label folding and alias-table lookup.
//!
//! Status columns coming out of the ETL layer are free text in mixed case,
//! with or without Portuguese accents, and sometimes compound
//! (`"Alugado - Oficina"`). Every classifier in the engine goes through
//! [`resolve_alias`] so that the folding rules stay identical everywhere.

/// Lowercases, strips Latin accents and collapses punctuation into single spaces.
pub fn fold_label(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            c if c.is_alphanumeric() => c,
            _ => ' ',
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether two labels are equal after folding.
pub fn labels_match(a: &str, b: &str) -> bool {
    fold_label(a) == fold_label(b)
}

/// Whether an optional text field is missing or whitespace only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Resolves a raw label against an alias table.
///
/// Aliases must already be folded. An exact match wins outright. Otherwise every
/// alias appearing as a whole-word sequence inside the label is a candidate and
/// the candidate with the highest `rank` is returned; equal ranks keep table order.
pub fn resolve_alias<T: Copy>(
    table: &[(&str, T)],
    label: &str,
    rank: impl Fn(T) -> u8,
) -> Option<T> {
    let folded = fold_label(label);
    if folded.is_empty() {
        return None;
    }

    if let Some((_, value)) = table.iter().find(|(alias, _)| *alias == folded) {
        return Some(*value);
    }

    let padded = format!(" {} ", folded);
    let mut best: Option<T> = None;
    for (alias, value) in table {
        if !padded.contains(&format!(" {} ", alias)) {
            continue;
        }
        match best {
            Some(current) if rank(*value) <= rank(current) => {}
            _ => best = Some(*value),
        }
    }
    best
}
