use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: String,
	pub email: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<DateTime<Utc>>,
}

/// An authenticated session: the bearer token and who it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
	pub token: String,
	pub user: User,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignupRequest {
	pub email: String,
	pub password: String,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

fn validate_email(email: &str) -> Result<()> {
	let valid = match email.split_once('@') {
		Some((local, domain)) => {
			!local.is_empty()
				&& !domain.contains('@')
				&& domain
					.split_once('.')
					.is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
		}
		None => false,
	};
	if valid {
		Ok(())
	} else {
		Err(ApiError::Validation("Please enter a valid email address".into()))
	}
}

impl SignupRequest {
	pub fn new(email: &str, password: &str, name: &str) -> Self {
		Self {
			email: email.trim().to_string(),
			password: password.to_string(),
			name: name.trim().to_string(),
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.email.is_empty() || self.password.is_empty() || self.name.is_empty() {
			return Err(ApiError::Validation("Email, password, and name are required".into()));
		}
		validate_email(&self.email)?;
		if self.password.chars().count() < MIN_PASSWORD_LEN {
			return Err(ApiError::Validation(format!(
				"Password must be at least {MIN_PASSWORD_LEN} characters long"
			)));
		}
		Ok(())
	}
}

impl LoginRequest {
	pub fn new(email: &str, password: &str) -> Self {
		Self {
			email: email.trim().to_string(),
			password: password.to_string(),
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.email.is_empty() || self.password.is_empty() {
			return Err(ApiError::Validation("Email and password are required".into()));
		}
		validate_email(&self.email)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn signup_validation() {
		assert!(SignupRequest::new("ada@example.com", "secret", "Ada").validate().is_ok());
		assert!(matches!(
			SignupRequest::new("ada@example.com", "12345", "Ada").validate(),
			Err(ApiError::Validation(msg)) if msg.contains("at least 6")
		));
		assert!(SignupRequest::new("ada@example", "secret", "Ada").validate().is_err());
		assert!(SignupRequest::new("ada@example.com", "secret", "  ").validate().is_err());
		assert!(SignupRequest::new("@example.com", "secret", "Ada").validate().is_err());
	}

	#[test]
	fn login_trims_email() {
		let req = LoginRequest::new("  ada@example.com ", "pw");
		assert_eq!(req.email, "ada@example.com");
		assert!(req.validate().is_ok());
		assert!(LoginRequest::new("", "pw").validate().is_err());
	}

	#[test]
	fn user_decodes_without_timestamps() {
		let user: User =
			serde_json::from_str(r#"{"id":"u1","email":"a@b.co","name":"A"}"#).unwrap();
		assert_eq!(user.name, "A");
		assert_eq!(user.created_at, None);
	}
}
