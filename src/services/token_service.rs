// src/services/token_service.rs

//! Issues and verifies the signed bearer credentials shared across the
//! storefront services. Verification checks signature, issuer, audience and
//! expiry with zero clock leeway; any mismatch rejects the credential with
//! no partial trust.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub name: String,
  pub role: String,
  pub jti: String,
  pub iss: String,
  pub aud: String,
  pub iat: i64,
  pub exp: i64,
}

/// The authenticated identity carried by a verified credential.
#[derive(Debug, Clone)]
pub struct Identity {
  pub subject: String,
  pub role: String,
}

pub struct IssuedToken {
  pub token: String,
  pub issued_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  issuer: String,
  audience: String,
  expire_minutes: i64,
}

impl TokenService {
  pub fn new(secret: &str, issuer: &str, audience: &str, expire_minutes: i64) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      issuer: issuer.to_string(),
      audience: audience.to_string(),
      expire_minutes,
    }
  }

  pub fn issuer(&self) -> &str {
    &self.issuer
  }

  pub fn audience(&self) -> &str {
    &self.audience
  }

  #[instrument(name = "token_service::issue", skip(self), fields(subject = %subject, role = %role))]
  pub fn issue(&self, subject: &str, role: &str) -> Result<IssuedToken> {
    let issued_at = Utc::now();
    let expires_at = issued_at + ChronoDuration::minutes(self.expire_minutes);

    let claims = Claims {
      sub: subject.to_string(),
      name: subject.to_string(),
      role: role.to_string(),
      jti: Uuid::new_v4().to_string(),
      iss: self.issuer.clone(),
      aud: self.audience.clone(),
      iat: issued_at.timestamp(),
      exp: expires_at.timestamp(),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("Failed to sign credential: {}", e)))?;

    debug!("Issued credential.");
    Ok(IssuedToken {
      token,
      issued_at,
      expires_at,
    })
  }

  #[instrument(name = "token_service::verify", skip(self, token))]
  pub fn verify(&self, token: &str) -> Result<Identity> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0; // Reject the moment a credential expires
    validation.set_issuer(&[self.issuer.as_str()]);
    validation.set_audience(&[self.audience.as_str()]);

    let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
      warn!(error = %e, "Credential verification failed");
      AppError::Auth("Invalid or expired credential".to_string())
    })?;

    Ok(Identity {
      subject: data.claims.sub,
      role: data.claims.role,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn service() -> TokenService {
    TokenService::new("test-secret", "storefront-auth", "storefront", 60)
  }

  #[test]
  fn issue_then_verify_roundtrip() {
    let tokens = service();
    let issued = tokens.issue("admin", "Admin").unwrap();
    assert!(issued.expires_at > issued.issued_at);

    let identity = tokens.verify(&issued.token).unwrap();
    assert_eq!(identity.subject, "admin");
    assert_eq!(identity.role, "Admin");
  }

  #[test]
  fn expired_credential_is_rejected() {
    let tokens = TokenService::new("test-secret", "storefront-auth", "storefront", -5);
    let issued = tokens.issue("admin", "Admin").unwrap();
    assert!(matches!(tokens.verify(&issued.token), Err(AppError::Auth(_))));
  }

  #[test]
  fn wrong_audience_is_rejected() {
    let other = TokenService::new("test-secret", "storefront-auth", "someone-else", 60);
    let issued = other.issue("admin", "Admin").unwrap();
    assert!(service().verify(&issued.token).is_err());
  }

  #[test]
  fn wrong_issuer_is_rejected() {
    let other = TokenService::new("test-secret", "rogue-issuer", "storefront", 60);
    let issued = other.issue("admin", "Admin").unwrap();
    assert!(service().verify(&issued.token).is_err());
  }

  #[test]
  fn tampered_signature_is_rejected() {
    let tokens = service();
    let mut token = tokens.issue("admin", "Admin").unwrap().token;
    token.push('A');
    assert!(tokens.verify(&token).is_err());
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let other = TokenService::new("another-secret", "storefront-auth", "storefront", 60);
    let issued = other.issue("admin", "Admin").unwrap();
    assert!(service().verify(&issued.token).is_err());
  }
}
