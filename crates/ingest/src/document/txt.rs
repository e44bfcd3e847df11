use super::ExtractionError;

pub fn extract_txt(bytes: &[u8]) -> Result<String, ExtractionError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_text() {
        let content = b"Hello, world!\nThis is a test file.";
        let text = extract_txt(content).unwrap();
        assert_eq!(text, "Hello, world!\nThis is a test file.");
    }

    #[test]
    fn extract_utf8_text() {
        let content = "Ünïcödé text with émojis 🎉".as_bytes();
        assert_eq!(extract_txt(content).unwrap(), "Ünïcödé text with émojis 🎉");
    }

    #[test]
    fn extract_empty_text() {
        assert_eq!(extract_txt(b"").unwrap(), "");
    }

    #[test]
    fn keeps_whitespace_verbatim() {
        assert_eq!(extract_txt(b"  \n  Hello  \n  ").unwrap(), "  \n  Hello  \n  ");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = extract_txt(&[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUtf8(_)));
    }
}
