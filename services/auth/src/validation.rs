//! Input validation utilities

use std::sync::OnceLock;

use common::forms::FormErrors;
use regex::Regex;

use crate::models::{ChangePasswordRequest, LoginCredentials, ProfileUpdate, RegisterRequest};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("Failed to compile email regex"))
}

fn website_regex() -> &'static Regex {
    static WEBSITE_REGEX: OnceLock<Regex> = OnceLock::new();
    WEBSITE_REGEX
        .get_or_init(|| Regex::new(r"^https?://.+").expect("Failed to compile website regex"))
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("Failed to compile phone regex"))
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() < MIN_NAME_LEN {
        return Err("Name must be at least 2 characters".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if !email_regex().is_match(email) {
        return Err("Please enter a valid email".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters".to_string());
    }

    Ok(())
}

/// Empty is fine; otherwise it must be an http(s) URL
pub fn validate_website(website: &str) -> bool {
    let website = website.trim();
    website.is_empty() || website_regex().is_match(website)
}

/// Empty is fine; otherwise digits, spaces, dashes, parentheses and a leading `+`
pub fn validate_phone(phone: &str) -> bool {
    let phone = phone.trim();
    phone.is_empty() || phone_regex().is_match(phone)
}

fn record(errors: &mut FormErrors, field: &str, result: Result<(), String>) {
    if let Err(message) = result {
        errors.add(field, message);
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        record(&mut errors, "name", validate_name(&self.name));
        record(&mut errors, "email", validate_email(&self.email));
        record(&mut errors, "password", validate_password(&self.password));

        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Please confirm your password");
        } else if self.confirm_password != self.password {
            errors.add("confirmPassword", "Passwords do not match");
        }

        if !validate_website(&self.profile.website) {
            errors.add(
                "website",
                "Please enter a valid URL (starting with http:// or https://)",
            );
        }
        if !validate_phone(&self.profile.phone) {
            errors.add("phone", "Please enter a valid phone number");
        }
        errors
    }
}

impl LoginCredentials {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        record(&mut errors, "email", validate_email(&self.email));
        record(&mut errors, "password", validate_password(&self.password));
        errors
    }
}

impl ProfileUpdate {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        record(&mut errors, "email", validate_email(&self.email));
        if !validate_website(&self.profile.website) {
            errors.add("website", "Please enter a valid URL");
        }
        if !validate_phone(&self.profile.phone) {
            errors.add("phone", "Please enter a valid phone number");
        }
        errors
    }
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.current_password.is_empty() {
            errors.add("currentPassword", "Current password is required");
        }

        if self.new_password.is_empty() {
            errors.add("newPassword", "New password is required");
        } else if let Err(message) = validate_password(&self.new_password) {
            errors.add("newPassword", message);
        }

        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Please confirm your new password");
        } else if self.confirm_password != self.new_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors
    }
}
