//! Message text helpers for the line-oriented session format.

/// Removes every whitespace character from `text`.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Splits `text` into groups of `size` characters joined by single spaces.
///
/// The last group may be shorter. A `size` of 0 returns `text` unchanged.
pub fn group(text: &str, size: usize) -> String {
    if size == 0 {
        return text.to_string();
    }
    let mut output = String::with_capacity(text.len() + text.len() / size);
    for (i, c) in text.chars().enumerate() {
        if i > 0 && i % size == 0 {
            output.push(' ');
        }
        output.push(c);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" FROM his\tshoulder "), "FROMhisshoulder");
        assert_eq!(strip_whitespace("   "), "");
    }

    #[test]
    fn test_group_by_five() {
        assert_eq!(group("QVPQSOKOILPUBKJZPISFXDW", 5), "QVPQS OKOIL PUBKJ ZPISF XDW");
        assert_eq!(group("ABCDEFGHIJ", 5), "ABCDE FGHIJ");
        assert_eq!(group("ABC", 5), "ABC");
        assert_eq!(group("", 5), "");
    }

    #[test]
    fn test_group_zero_size() {
        assert_eq!(group("ABCDEF", 0), "ABCDEF");
    }
}
