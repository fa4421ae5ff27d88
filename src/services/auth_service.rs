// src/services/auth_service.rs

//! Password hashing/verification and the injected credential repository
//! backing `POST /auth/login`.

use crate::errors::AppError; // Application-specific error type
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,   // The main trait for hashing
    PasswordVerifier, // The main trait for verifying
    SaltString,
  },
  Argon2, // The Argon2 algorithm instance
};
use tracing::{debug, error, instrument};

/// A stored login credential. The password is held only as an argon2 hash.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
  pub username: String,
  pub password_hash: String,
  pub role: String,
}

/// Lookup of login credentials. Injected into `AppState` so the login
/// handler has no hidden global state; the sole runtime implementation is a
/// fixed in-memory demo record.
pub trait CredentialRepository: Send + Sync {
  fn find_by_username(&self, username: &str) -> Option<CredentialRecord>;
}

pub struct InMemoryCredentialRepository {
  records: Vec<CredentialRecord>,
}

impl InMemoryCredentialRepository {
  pub fn new(records: Vec<CredentialRecord>) -> Self {
    Self { records }
  }

  /// Single fixed login record, hashed at startup.
  pub fn with_user(username: &str, password: &str, role: &str) -> Result<Self, AppError> {
    let password_hash = hash_password(password)?;
    Ok(Self::new(vec![CredentialRecord {
      username: username.to_string(),
      password_hash,
      role: role.to_string(),
    }]))
  }
}

impl CredentialRepository for InMemoryCredentialRepository {
  fn find_by_username(&self, username: &str) -> Option<CredentialRecord> {
    self.records.iter().find(|r| r.username == username).cloned()
  }
}

/// Hashes a plain-text password using Argon2.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  debug!("Attempting to hash password.");
  if password.is_empty() {
    error!("Password hashing failed: Password cannot be empty.");
    return Err(AppError::Validation(
      "Password cannot be empty for hashing.".to_string(),
    ));
  }

  let salt = SaltString::generate(&mut OsRng); // Generate a cryptographically secure random salt
  let argon2_hasher = Argon2::default(); // Use default Argon2 parameters (recommended)

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!(
        "Password hashing process failed: {}",
        argon_err
      )))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// Returns `Ok(false)` when the password simply does not match; other
/// failures (empty inputs, malformed stored hash) surface as errors.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  debug!("Attempting to verify password.");
  if hashed_password_str.is_empty() {
    error!("Password verification failed: Stored hash string is empty.");
    return Err(AppError::Auth("Invalid stored password format (empty).".to_string()));
  }
  if provided_password.is_empty() {
    error!("Password verification failed: Provided password is empty.");
    return Err(AppError::Auth(
      "Provided password for verification cannot be empty.".to_string(),
    ));
  }

  // Parse the stored hash string into a PasswordHash object
  let parsed_hash = match PasswordHash::new(hashed_password_str) {
    Ok(ph) => ph,
    Err(parse_err) => {
      error!(error = %parse_err, "Failed to parse stored password hash string.");
      return Err(AppError::Internal(format!(
        "Invalid stored password hash format: {}",
        parse_err
      )));
    }
  };

  let argon2_verifier = Argon2::default();

  match argon2_verifier.verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => {
      debug!("Password verification successful: Passwords match.");
      Ok(true)
    }
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}
