use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex")
});

pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

pub fn looks_like_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn min_chars_counts_characters_not_bytes() {
        assert!(has_min_chars("abc", 3));
        assert!(!has_min_chars("ab", 3));
        assert!(has_min_chars("ёжи", 3));
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("sosa@webscope.io"));
        assert!(!looks_like_email("sosa@webscope"));
        assert!(!looks_like_email("sosa webscope.io"));
        assert!(!looks_like_email("@webscope.io"));
    }
}
