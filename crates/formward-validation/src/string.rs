//! String helpers shared by validators and widgets

/// Length check in characters, inclusive on both ends.
pub fn validate_length(s: &str, min: usize, max: usize) -> Result<(), String> {
    let len = s.chars().count();
    if len < min {
        Err(format!("Must be at least {} characters", min))
    } else if len > max {
        Err(format!("Must be at most {} characters", max))
    } else {
        Ok(())
    }
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Case-insensitive substring test.
/// Unicode case-insensitive equality
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Byte ranges of every case-insensitive, non-overlapping match of `needle`
/// in `haystack`.
///
/// Matching is done per char with simple lowercase folding so ranges always
/// land on char boundaries of the original text.
pub fn match_ranges(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let chars: Vec<(usize, char)> = haystack.char_indices().collect();
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let mut matched = 0;
        let mut j = i;
        while j < chars.len() && matched < needle.len() {
            let mut folded = chars[j].1.to_lowercase();
            match (folded.next(), folded.next()) {
                (Some(c), None) if c == needle[matched] => {
                    matched += 1;
                    j += 1;
                }
                _ => break,
            }
        }

        if matched == needle.len() {
            let start = chars[i].0;
            let end = chars.get(j).map(|(idx, _)| *idx).unwrap_or(haystack.len());
            ranges.push((start, end));
            i = j;
        } else {
            i += 1;
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert!(validate_length("hello", 3, 10).is_ok());
        assert!(validate_length("hi", 3, 10).is_err());
        assert!(validate_length("verylongstring", 3, 10).is_err());
        assert!(validate_length("héllo", 5, 5).is_ok());
    }

    #[test]
    fn test_blank() {
        assert!(is_blank("   \t"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Beginner Surf Lessons", "surf"));
        assert!(!contains_ignore_case("Yoga", "surf"));
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Crème", "CRÈME"));
        assert!(eq_ignore_case("water", "Water"));
        assert!(!eq_ignore_case("Crème", "Creme"));
    }

    #[test]
    fn test_match_ranges() {
        assert_eq!(match_ranges("Surf and surf", "SURF"), vec![(0, 4), (9, 13)]);
        assert_eq!(match_ranges("aaaa", "aa"), vec![(0, 2), (2, 4)]);
        assert!(match_ranges("anything", "").is_empty());
        assert_eq!(match_ranges("Café Crème", "crème"), vec![(6, 12)]);
    }
}
