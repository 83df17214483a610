/// Plain-text extraction from the open message

use crate::error::ExtractionError;

/// Quoted replies are dropped before reading the text
pub const QUOTED_REPLY_SELECTOR: &str = "blockquote";

/// Trim rendered text. The interior is sent as rendered.
/// Nothing left means there is nothing to analyze.
pub fn normalize_text(raw: &str) -> Result<String, ExtractionError> {
    let text = raw.trim();

    if text.is_empty() {
        Err(ExtractionError::EmptyText)
    } else {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_text("  Hello there \n"), Ok("Hello there".to_string()));
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert_eq!(normalize_text(""), Err(ExtractionError::EmptyText));
        assert_eq!(normalize_text("   "), Err(ExtractionError::EmptyText));
        assert_eq!(normalize_text("\n\t\r\n  "), Err(ExtractionError::EmptyText));
    }

    #[test]
    fn test_normalize_keeps_interior_blank_lines() {
        let raw = "Dear winner,\n\n\n\n  \nClaim now";
        assert_eq!(normalize_text(raw), Ok(raw.to_string()));
    }

    #[test]
    fn test_normalize_keeps_paragraph_breaks() {
        let raw = "First line\nSecond line\n\nNew paragraph";
        assert_eq!(normalize_text(raw), Ok(raw.to_string()));
    }
}
