use regex::Regex;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("zone name is empty")]
    Empty,
    #[error("zone name too long (max 253 characters)")]
    TooLong,
    #[error("label '{0}' is empty or longer than 63 characters")]
    BadLabelLength(String),
    #[error("label '{0}' contains invalid characters (only letters, digits, '-' and '_' allowed)")]
    InvalidCharacters(String),
    #[error("label '{0}' must not start or end with '-'")]
    LeadingOrTrailingHyphen(String),
}

lazy_static::lazy_static! {
    /// Letters, digits, '-' and '_' (service labels such as _dmarc)
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() || label.len() > 63 {
        return Err(ValidationError::BadLabelLength(label.to_string()));
    }
    if !LABEL_RE.is_match(label) {
        return Err(ValidationError::InvalidCharacters(label.to_string()));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(ValidationError::LeadingOrTrailingHyphen(label.to_string()));
    }
    Ok(())
}

/// Check a zone name before it is placed in a request path.
///
/// A single trailing dot is accepted. This is stricter than the service:
/// classless reverse zones such as `0/26.2.0.192.in-addr.arpa` are refused,
/// since their `/` would split the request path.
pub fn validate_zone_name(zone: &str) -> Result<(), ValidationError> {
    let name = zone.strip_suffix('.').unwrap_or(zone);
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }
    if name.len() > 253 {
        return Err(ValidationError::TooLong);
    }
    for label in name.split('.') {
        validate_label(label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["example.com", "example.com.", "Sub-1.Example.NET", "_dmarc.example.com", "localhost"] {
            assert_eq!(validate_zone_name(name), Ok(()), "{name}");
        }
    }

    #[test]
    fn rejects_names_unsafe_for_a_path() {
        assert_eq!(validate_zone_name(""), Err(ValidationError::Empty));
        assert_eq!(validate_zone_name("."), Err(ValidationError::Empty));
        assert_eq!(
            validate_zone_name("example.com/records"),
            Err(ValidationError::InvalidCharacters("com/records".into()))
        );
        assert_eq!(
            validate_zone_name("example..com"),
            Err(ValidationError::BadLabelLength(String::new()))
        );
        assert_eq!(
            validate_zone_name("-bad.example.com"),
            Err(ValidationError::LeadingOrTrailingHyphen("-bad".into()))
        );
    }

    #[test]
    fn rejects_classless_reverse_zones() {
        assert_eq!(
            validate_zone_name("0/26.2.0.192.in-addr.arpa"),
            Err(ValidationError::InvalidCharacters("0/26".into()))
        );
    }

    #[test]
    fn enforces_length_limits() {
        let long_label = "a".repeat(64);
        assert_eq!(
            validate_zone_name(&format!("{long_label}.com")),
            Err(ValidationError::BadLabelLength(long_label))
        );

        let long_name = vec!["a".repeat(50); 6].join(".");
        assert_eq!(validate_zone_name(&long_name), Err(ValidationError::TooLong));
    }
}
