use auth::opaque::PLAINTEXT_LEN;

use crate::domain::validation::is_email;
use crate::domain::validation::length_within;
use crate::domain::validation::not_blank;
use crate::domain::validation::Validator;
use crate::user::models::RegisterUserCommand;

const MAX_NAME_BYTES: usize = 500;
const MAX_EMAIL_BYTES: usize = 500;
const MIN_PASSWORD_BYTES: usize = 8;
const MAX_PASSWORD_BYTES: usize = 32;

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(not_blank(email), "email", "must be provided");
    v.check(is_email(email), "email", "must be a valid email address");
    v.check(
        email.len() <= MAX_EMAIL_BYTES,
        "email",
        "must not be more than 500 bytes long",
    );
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= MIN_PASSWORD_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        length_within(password, MIN_PASSWORD_BYTES, MAX_PASSWORD_BYTES),
        "password",
        "must not be more than 32 bytes long",
    );
}

pub fn validate_registration(v: &mut Validator, command: &RegisterUserCommand) {
    v.check(not_blank(&command.name), "name", "must be provided");
    v.check(
        command.name.len() <= MAX_NAME_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );

    validate_email(v, &command.email);
    validate_password_plaintext(v, &command.password);
}

pub fn validate_token_plaintext(v: &mut Validator, token: &str) {
    v.check(!token.is_empty(), "token", "must be provided");
    v.check(
        token.len() == PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_for(check: impl FnOnce(&mut Validator)) -> Vec<(String, String)> {
        let mut v = Validator::new();
        check(&mut v);
        v.errors()
            .iter()
            .map(|(field, message)| (field.to_string(), message.to_string()))
            .collect()
    }

    #[test]
    fn test_email_rules() {
        assert!(errors_for(|v| validate_email(v, "alice@example.com")).is_empty());

        let errors = errors_for(|v| validate_email(v, ""));
        assert_eq!(errors, vec![("email".into(), "must be provided".into())]);

        let errors = errors_for(|v| validate_email(v, "alice"));
        assert_eq!(
            errors,
            vec![("email".into(), "must be a valid email address".into())]
        );
    }

    #[test]
    fn test_password_bounds_are_inclusive() {
        assert!(errors_for(|v| validate_password_plaintext(v, "12345678")).is_empty());
        assert!(errors_for(|v| validate_password_plaintext(v, &"a".repeat(32))).is_empty());

        let errors = errors_for(|v| validate_password_plaintext(v, "1234567"));
        assert_eq!(
            errors,
            vec![("password".into(), "must be at least 8 bytes long".into())]
        );

        let errors = errors_for(|v| validate_password_plaintext(v, &"a".repeat(33)));
        assert_eq!(
            errors,
            vec![("password".into(), "must not be more than 32 bytes long".into())]
        );

        let errors = errors_for(|v| validate_password_plaintext(v, ""));
        assert_eq!(errors, vec![("password".into(), "must be provided".into())]);
    }

    #[test]
    fn test_registration_collects_every_field() {
        let command = RegisterUserCommand::new(String::new(), "nope".into(), "short".into());
        let errors = errors_for(|v| validate_registration(v, &command));

        let fields: Vec<_> = errors.iter().map(|(field, _)| field.as_str()).collect();
        assert_eq!(fields, vec!["email", "name", "password"]);
    }

    #[test]
    fn test_token_rules() {
        assert!(
            errors_for(|v| validate_token_plaintext(v, "Y3QMGX3PJ3WLRL2YRTQGQ6KRHU")).is_empty()
        );

        let errors = errors_for(|v| validate_token_plaintext(v, "abc"));
        assert_eq!(errors, vec![("token".into(), "must be 26 bytes long".into())]);
    }
}
