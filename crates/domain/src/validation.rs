//! Primitive (context-free) validation rules.
//!
//! These run before any external lookup so that a malformed command never
//! costs a network or database round trip.

/// Checks an email address against a permissive `local@domain` grammar:
/// printable ASCII, no whitespace, exactly one `@`, and a dotted domain.
pub fn email_is_valid(email: &str) -> bool {
    let length = email.chars().count();
    if !(3..=320).contains(&length) {
        return false;
    }
    if !email.is_ascii() || email.chars().any(|c| c.is_ascii_whitespace() || c.is_ascii_control()) {
        return false;
    }

    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain must have a dot with labels on both sides.
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

/// Checks password strength: 10–64 characters with at least one uppercase
/// letter, one lowercase letter, one digit, and one non-alphanumeric
/// character.
pub fn password_is_valid(password: &str) -> bool {
    let length = password.chars().count();
    if !(10..=64).contains(&length) {
        return false;
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    has_upper && has_lower && has_digit && has_symbol
}

/// Checks a username: 3–32 characters, ASCII alphanumeric and underscore
/// only.
pub fn username_is_valid(username: &str) -> bool {
    let length = username.chars().count();
    (3..=32).contains(&length)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks a `#RRGGBB` hex color string.
pub fn hex_color_is_valid(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks a business key: 1–64 characters, ASCII uppercase alphanumeric and
/// underscore only (e.g. `STARTER_CREDIT_CARD`).
pub fn business_key_is_valid(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
