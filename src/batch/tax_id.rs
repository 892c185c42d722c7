/// Normalizes a company tax identifier to its digits.
///
/// Spreadsheet exports often turn long identifiers into scientific notation
/// with a decimal comma (`1,1222333000181E+13`). Such values are expanded
/// back to an integer before every non-digit is dropped. When the value
/// cannot be read as a number, the digits of the raw input are kept.
pub fn normalize_tax_id(raw: &str) -> String {
    let expanded = if raw.contains(['E', 'e']) {
        expand_scientific(raw)
    } else {
        None
    };
    expanded
        .as_deref()
        .unwrap_or(raw)
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

fn expand_scientific(raw: &str) -> Option<String> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then(|| format!("{value:.0}"))
}
