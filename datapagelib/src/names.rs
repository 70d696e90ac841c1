//! Identifier rules shared by column descriptors, page elements and output files.

use crate::error::DatapageError;
use crate::Result;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_file_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Check that a name consists solely of `[0-9A-Za-z_]`.
pub fn validate_name(name: &str) -> Result<()> {
    if name.chars().all(is_identifier_char) {
        Ok(())
    } else {
        Err(DatapageError::InvalidName(name.to_string()))
    }
}

/// Create a file stem without whitespace.
///
/// Whitespace becomes `_`, then everything outside `[0-9A-Za-z\-_.]` is dropped.
/// The result may be empty; see [`output_file_stem`] for the checked variant.
pub fn extract_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| is_file_name_char(*c))
        .collect()
}

/// Sanitize an output name, failing when nothing usable is left.
pub fn output_file_stem(name: &str) -> Result<String> {
    let stem = extract_name(name);
    if stem.is_empty() {
        return Err(DatapageError::InvalidOutputName(stem));
    }
    Ok(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("bad_name_1").is_ok());
        assert!(validate_name("Revenue2020").is_ok());
        assert!(validate_name("").is_ok());

        let result = validate_name("bad name!");
        if let Err(DatapageError::InvalidName(name)) = result {
            assert_eq!(name, "bad name!");
        } else {
            panic!("Expected InvalidName error");
        }
        assert!(validate_name("dash-name").is_err());
        assert!(validate_name("umlaut_ä").is_err());
    }

    #[test]
    fn test_extract_name() {
        assert_eq!(extract_name("Quarterly Report"), "Quarterly_Report");
        assert_eq!(extract_name("sales\t2024"), "sales_2024");
        assert_eq!(extract_name("a/b\\c:d"), "abcd");
        assert_eq!(extract_name("v1.2-final"), "v1.2-final");
        assert_eq!(extract_name("???"), "");
    }

    #[test]
    fn test_output_file_stem_rejects_empty() {
        assert_eq!(output_file_stem("My Page").unwrap(), "My_Page");
        assert!(matches!(
            output_file_stem("!!!"),
            Err(DatapageError::InvalidOutputName(_))
        ));
        assert!(matches!(
            output_file_stem(""),
            Err(DatapageError::InvalidOutputName(_))
        ));
    }
}
