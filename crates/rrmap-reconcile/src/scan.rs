//! Numeric token scanner for raw log text.
//!
//! Recognizes `-?digits?(.digits?)?` with at least one digit, left to right
//! and without overlap. A bare `.`, `-` or `-.` is never a token. Offsets
//! are byte offsets into the scanned text and always fall on ASCII
//! characters, so slicing with them is safe.

/// A numeric token found in raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericToken<'a> {
    /// Token text as it appears in the log.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Iterator over the numeric tokens of a text.
#[derive(Debug, Clone)]
pub struct TokenScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TokenScanner<'a> {
    /// Start scanning `text` from the beginning.
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

fn digits_from(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i
}

impl<'a> Iterator for TokenScanner<'a> {
    type Item = NumericToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let start = self.pos;
            let mut i = start;
            if bytes[i] == b'-' {
                i += 1;
            }
            let int_end = digits_from(bytes, i);
            let mut end = int_end;
            let mut digit_count = int_end - i;
            if end < bytes.len() && bytes[end] == b'.' {
                let frac_end = digits_from(bytes, end + 1);
                digit_count += frac_end - (end + 1);
                end = frac_end;
            }
            if digit_count == 0 {
                self.pos = start + 1;
                continue;
            }
            self.pos = end;
            return Some(NumericToken {
                text: &self.text[start..end],
                start,
                end,
            });
        }
        None
    }
}

/// Collect every numeric token of `text` in scan order.
pub fn scan_tokens(text: &str) -> Vec<NumericToken<'_>> {
    TokenScanner::new(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(s: &str) -> Vec<&str> {
        scan_tokens(s).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn finds_regression_output_numbers() {
        let log = "       x |   .1234567   .0456789     2.70   0.007";
        assert_eq!(texts(log), vec![".1234567", ".0456789", "2.70", "0.007"]);
    }

    #[test]
    fn negative_tokens_and_offsets() {
        let toks = scan_tokens("b = -3.5;");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].text, "-3.5");
        assert_eq!((toks[0].start, toks[0].end), (4, 8));
    }

    #[test]
    fn bare_dot_and_dash_rejected() {
        assert!(texts(". - -. ... --").is_empty());
        assert_eq!(texts("--5"), vec!["-5"]);
    }

    #[test]
    fn trailing_dot_belongs_to_token() {
        assert_eq!(texts("obs 12."), vec!["12."]);
    }

    #[test]
    fn consecutive_dots_split_tokens() {
        assert_eq!(texts("1.2.3"), vec!["1.2", ".3"]);
    }

    #[test]
    fn identifiers_with_digits_yield_tokens() {
        assert_eq!(texts("x1_sq"), vec!["1"]);
    }

    #[test]
    fn multibyte_text_offsets_slice_cleanly() {
        let log = "é 4.2 ü";
        let toks = scan_tokens(log);
        assert_eq!(&log[toks[0].start..toks[0].end], "4.2");
    }

    #[test]
    fn no_numbers() {
        assert!(scan_tokens("no numbers here").is_empty());
        assert!(scan_tokens("").is_empty());
    }
}
