use thiserror::Error;

/// Errors raised when a domain invariant is violated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Trims an optional text field, collapsing blank values to `None`
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a required text field, failing with `message` when it is blank
pub(crate) fn required(value: impl Into<String>, message: &str) -> Result<String, DomainError> {
    let value = value.into().trim().to_string();
    if value.is_empty() {
        return Err(DomainError::validation(message));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" a ".to_string())), Some("a".to_string()));
    }

    #[test]
    fn required_rejects_whitespace() {
        let err = required("  ", "Name cannot be empty").unwrap_err();
        assert_eq!(err.to_string(), "Name cannot be empty");
    }
}
