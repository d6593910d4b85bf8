use crate::errors::AuthError;

/// Maps an auth provider error to the fixed message shown to users.
///
/// Matching is on the lower-cased message, first hit wins.
pub fn auth_error_message(error: &AuthError) -> &'static str {
    let message = error.message.to_lowercase();

    if message.contains("invalid login credentials") {
        return "Invalid email or password";
    }
    if message.contains("email already registered") {
        return "This email is already registered";
    }
    if message.contains("password") {
        return "Password should be at least 6 characters";
    }
    if message.contains("email") {
        return "Please enter a valid email address";
    }

    "Authentication failed. Please try again."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuthErrorKind;

    fn err(message: &str) -> AuthError {
        AuthError::new(AuthErrorKind::Internal, message)
    }

    #[test]
    fn classifies_known_messages() {
        assert_eq!(
            auth_error_message(&err("Invalid login credentials")),
            "Invalid email or password"
        );
        assert_eq!(
            auth_error_message(&err("Password too short")),
            "Password should be at least 6 characters"
        );
        assert_eq!(
            auth_error_message(&err("Network timeout")),
            "Authentication failed. Please try again."
        );
    }

    #[test]
    fn priority_order_is_respected() {
        // mentions both email and password; the registered check comes first
        assert_eq!(
            auth_error_message(&err("Email already registered, reset password?")),
            "This email is already registered"
        );
        assert_eq!(
            auth_error_message(&err("email or password missing")),
            "Password should be at least 6 characters"
        );
        assert_eq!(
            auth_error_message(&err("Unable to validate EMAIL address")),
            "Please enter a valid email address"
        );
    }

    #[test]
    fn empty_message_falls_through() {
        assert_eq!(
            auth_error_message(&err("")),
            "Authentication failed. Please try again."
        );
    }

    #[test]
    fn provider_constructors_classify_as_expected() {
        assert_eq!(
            auth_error_message(&AuthError::invalid_credentials()),
            "Invalid email or password"
        );
        assert_eq!(
            auth_error_message(&AuthError::email_taken()),
            "This email is already registered"
        );
    }
}
