//! Tag normalization

/// Normalize a user supplied tag name: trimmed, lower-cased, inner whitespace collapsed
pub fn normalize_tag(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// ASCII slug identifying a tag, so "Électro" and "electro" are the same tag
pub fn tag_slug(name: &str) -> String {
    let ascii = deunicode::deunicode(&normalize_tag(name)).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Dream   Pop "), "dream pop");
        assert_eq!(normalize_tag("R&B"), "r&b");
    }

    #[test]
    fn test_tag_slug() {
        assert_eq!(tag_slug("Dream Pop"), "dream-pop");
        assert_eq!(tag_slug("Électro"), "electro");
        assert_eq!(tag_slug("drum & bass"), "drum-bass");
        assert_eq!(tag_slug("!!!"), "");
    }
}
