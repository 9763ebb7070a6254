use super::validators::{has_min_chars, looks_like_email};
use super::ValidationError;

pub const PASSWORD_MIN_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, derive_more::Display, serde::Serialize)]
#[serde(transparent)]
pub struct Email(String);

/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, serde::Serialize)]
#[serde(transparent)]
pub struct Password(String);

impl Email {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let value = value.trim().to_owned();
        if looks_like_email(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::message("Invalid email address"))
        }
    }

    #[cfg(test)]
    pub fn value_ref(&self) -> &str {
        &self.0
    }
}

impl Password {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if has_min_chars(&value, PASSWORD_MIN_LENGTH) {
            Ok(Self(value))
        } else {
            Err(ValidationError::message(format!("Must be {PASSWORD_MIN_LENGTH} or more characters long")))
        }
    }

    #[cfg(test)]
    pub fn value_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn email_is_trimmed_and_checked() {
        let email = Email::new(" sosa@webscope.io ".to_owned()).expect("valid email");
        assert_eq!(email.value_ref(), "sosa@webscope.io");

        let err = Email::new("sosa".to_owned()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email address");
    }

    #[test]
    fn password_length() {
        assert!(Password::new("1234".to_owned()).is_err());
        assert!(Password::new("12345".to_owned()).is_ok());

        let err = Password::new("abc".to_owned()).unwrap_err();
        assert_eq!(err.to_string(), "Must be 5 or more characters long");
    }

    #[test]
    fn password_is_not_leaked_by_debug() {
        let pwd = Password::new("secret-password".to_owned()).unwrap();
        assert_eq!(format!("{pwd:?}"), "Password(***)");
    }
}
