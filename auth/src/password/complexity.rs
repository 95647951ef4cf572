/// Characters that satisfy the "special character" class.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Check the password complexity rule.
///
/// True iff the password contains at least one uppercase letter, one
/// lowercase letter, one digit and one character from [`SPECIAL_CHARACTERS`].
/// Checked before hashing; says nothing about the stored digest.
pub fn has_complexity(password: &str) -> bool {
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(char::is_numeric);
    let has_special = password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

    has_upper && has_lower && has_digit && has_special
}
