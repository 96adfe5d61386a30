//! Identifier-aware tokenizer.
//!
//! Rules, applied in order:
//!
//! 1. A break is inserted before an uppercase letter that follows a
//!    lowercase letter or digit (`faceBlur` → `face Blur`). Inside a run of
//!    capitals the only break is before the last capital when a lowercase
//!    letter follows it (`HTMLParser` → `HTML Parser`), so acronyms stay
//!    whole instead of splitting into single letters.
//! 2. Underscores, hyphens, slashes, whitespace, and any other
//!    non-alphanumeric character separate tokens.
//! 3. Tokens are lowercased.
//! 4. Empty tokens are dropped.

/// Tokenize text for indexing or querying.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut tokens);
            continue;
        }

        if c.is_uppercase() && i > 0 && is_case_boundary(&chars, i) {
            flush(&mut current, &mut tokens);
        }

        current.extend(c.to_lowercase());
    }
    flush(&mut current, &mut tokens);

    tokens
}

/// An uppercase char at `i` starts a new word if it follows a lowercase
/// letter or digit, or if it ends an acronym run (`HTMLParser`: the `P`).
fn is_case_boundary(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    if prev.is_lowercase() || prev.is_numeric() {
        return true;
    }
    prev.is_uppercase() && chars.get(i + 1).is_some_and(|next| next.is_lowercase())
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(
            tokenize("clean_html_mapper"),
            vec!["clean", "html", "mapper"]
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(
            tokenize("ImageFaceBlurMapper"),
            vec!["image", "face", "blur", "mapper"]
        );
        assert_eq!(tokenize("faceBlur"), vec!["face", "blur"]);
    }

    #[test]
    fn test_break_before_uppercase_after_lowercase() {
        assert_eq!(tokenize("cleanHtmlMapper"), vec!["clean", "html", "mapper"]);
        assert_eq!(tokenize("aB"), vec!["a", "b"]);
        assert_eq!(tokenize("x1Y"), vec!["x1", "y"]);
    }

    #[test]
    fn test_uppercase_run_is_not_split_into_letters() {
        assert_eq!(tokenize("HTML"), vec!["html"]);
        assert_eq!(tokenize("OCR"), vec!["ocr"]);
        assert_eq!(tokenize("PDFToText"), vec!["pdf", "to", "text"]);
    }

    #[test]
    fn test_acronym_in_description_matches_lowercase_query() {
        let doc = tokenize("clean_html_mapper strips HTML tags from text");
        assert_eq!(doc.iter().filter(|t| *t == "html").count(), 2);
        assert_eq!(tokenize("html"), vec!["html"]);
    }

    #[test]
    fn test_acronym_runs() {
        assert_eq!(tokenize("HTMLParser"), vec!["html", "parser"]);
        assert_eq!(tokenize("strips HTML tags"), vec!["strips", "html", "tags"]);
    }

    #[test]
    fn test_hyphen_slash_and_punctuation() {
        assert_eq!(
            tokenize("key-frame/scene, split."),
            vec!["key", "frame", "scene", "split"]
        );
    }

    #[test]
    fn test_digits_stay_attached() {
        assert_eq!(tokenize("video2text_mapper"), vec!["video2text", "mapper"]);
        assert_eq!(tokenize("v2Mapper"), vec!["v2", "mapper"]);
    }

    #[test]
    fn test_empty_and_separator_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" _-/ ").is_empty());
    }

    #[test]
    fn test_query_and_document_agree() {
        let doc = tokenize("clean_email_mapper removes email addresses from text");
        let query = tokenize("Clean Email");
        assert!(query.iter().all(|t| doc.contains(t)));
    }
}
