/// Resolve the body of an entity reference (the part between `&` and `;`).
///
/// Only the five predefined XML entities and well-formed numeric character
/// references resolve. Numeric references must name a Unicode scalar value
/// other than U+0000.
pub(crate) fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code = match numeric.strip_prefix('x') {
                Some(hex) => parse_digits(hex, 16)?,
                None => parse_digits(numeric, 10)?,
            };
            char::from_u32(code).filter(|&ch| ch != '\0')
        }
    }
}

fn parse_digits(digits: &str, radix: u32) -> Option<u32> {
    const MAX_DIGITS: usize = 8;
    if digits.is_empty() || digits.len() > MAX_DIGITS {
        return None;
    }
    if !digits.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}
