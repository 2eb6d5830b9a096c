//! Interpretation of user-entered edit values.
//!
//! The edit box accepts raw text. `42` should store the number 42, `"42"`
//! the string "42", and bare `hello` the string "hello" — so a failed JSON
//! parse is retried with the input wrapped in quotes before giving up.

use serde_json::Value;
use thiserror::Error;

/// The entered text is not valid JSON, even when read as a string literal.
#[derive(Debug, Error, PartialEq)]
#[error("cannot interpret {input:?} as a JSON value or plain string")]
pub struct ParseError {
    pub input: String,
}

/// Parse raw edit-box input into the JSON value to write.
///
/// Inputs containing characters that break the quoted form (an unescaped
/// `"`, a backslash escape that is not valid JSON) fail with [`ParseError`];
/// callers surface that to the user and must not issue a write.
pub fn parse_edit_input(raw: &str) -> Result<Value, ParseError> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }
    serde_json::from_str(&format!("\"{raw}\"")).map_err(|_| ParseError {
        input: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_json_is_taken_verbatim() {
        assert_eq!(parse_edit_input("42"), Ok(json!(42)));
        assert_eq!(parse_edit_input("3.5"), Ok(json!(3.5)));
        assert_eq!(parse_edit_input("true"), Ok(json!(true)));
        assert_eq!(parse_edit_input("null"), Ok(json!(null)));
        assert_eq!(parse_edit_input("\"quoted\""), Ok(json!("quoted")));
        assert_eq!(parse_edit_input("{\"a\": 1}"), Ok(json!({"a": 1})));
    }

    #[test]
    fn bare_text_becomes_a_string() {
        assert_eq!(parse_edit_input("hello"), Ok(json!("hello")));
        assert_eq!(parse_edit_input("hello world"), Ok(json!("hello world")));
        // invalid JSON but fine as a string
        assert_eq!(parse_edit_input("{bad"), Ok(json!("{bad")));
    }

    #[test]
    fn unquotable_input_is_an_error() {
        let err = parse_edit_input("say \"hi\"").unwrap_err();
        assert_eq!(err.input, "say \"hi\"");
        assert!(parse_edit_input("back\\slash").is_err());
    }
}
