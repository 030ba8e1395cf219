use crate::error::{KithError, KithResult};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_INSTAGRAM_HANDLE_LEN: usize = 30;

/// Validates that a string is not blank (empty or whitespace-only).
/// Returns the trimmed string on success.
pub fn non_blank(value: &str, field: &str) -> KithResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        Err(KithError::BlankField {
            field: field.to_string(),
        })
    } else {
        Ok(trimmed)
    }
}

/// Validates that an integer is positive (> 0).
pub fn positive(value: i32, field: &str) -> KithResult<i32> {
    if value <= 0 {
        Err(KithError::NonPositive {
            field: field.to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Validates that a set/vec is non-empty.
pub fn non_empty_set<T>(value: &[T], field: &str) -> KithResult<()> {
    if value.is_empty() {
        Err(KithError::EmptySet {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validates an optional positive integer (None is valid, Some(n) must be positive).
pub fn optional_positive(value: Option<i32>, field: &str) -> KithResult<Option<i32>> {
    match value {
        None => Ok(None),
        Some(n) => positive(n, field).map(Some),
    }
}

/// Trims an optional string, returning None if blank.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Normalizes an email address to its trimmed, lower-cased form.
pub fn email(value: &str, field: &str) -> KithResult<String> {
    let normalized = non_blank(value, field)?.to_lowercase();
    let mut parts = normalized.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(KithError::invalid(field, "must contain a single '@'")),
    };
    if local.is_empty() || normalized.chars().any(char::is_whitespace) {
        return Err(KithError::invalid(field, "is not an email address"));
    }
    let domain_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
    if !domain_ok {
        return Err(KithError::invalid(field, "domain must contain a dot"));
    }
    Ok(normalized)
}

pub fn password(value: &str, field: &str) -> KithResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(KithError::invalid(
            field,
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Accepts http(s) URLs and inline `data:image/` URLs.
pub fn image_url(value: &str, field: &str) -> KithResult<String> {
    let url = non_blank(value, field)?;
    let lower = url.to_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("data:image/") {
        Ok(url)
    } else {
        Err(KithError::invalid(field, "must be an http(s) or data:image URL"))
    }
}

/// Trims interests, drops blanks and case-insensitive duplicates, keeping first-seen order.
pub fn normalize_interests<S: AsRef<str>>(interests: &[S]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut result = Vec::new();
    for interest in interests {
        let trimmed = interest.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            result.push(trimmed.to_string());
        }
    }
    result
}

/// Accepts `name`, `@name` or an instagram.com profile URL and returns the bare handle.
pub fn instagram_handle(value: &str, field: &str) -> KithResult<String> {
    let raw = non_blank(value, field)?;
    let lower = raw.to_lowercase();
    let without_prefix = ["https://", "http://"]
        .iter()
        .find_map(|scheme| lower.strip_prefix(scheme))
        .unwrap_or(&lower);
    let without_host = ["www.instagram.com/", "instagram.com/"]
        .iter()
        .find_map(|host| without_prefix.strip_prefix(host))
        .unwrap_or(without_prefix);
    let handle = without_host
        .trim_start_matches('@')
        .split(['/', '?'])
        .next()
        .unwrap_or_default();

    let valid = !handle.is_empty()
        && handle.len() <= MAX_INSTAGRAM_HANDLE_LEN
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if valid {
        Ok(handle.to_string())
    } else {
        Err(KithError::invalid(field, "is not an Instagram handle"))
    }
}
