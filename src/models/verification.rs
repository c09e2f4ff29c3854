//! Entrepreneur verification request/response models.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::entrepreneur_verifications::{self, VerificationStatus};

lazy_static! {
    static ref DNI_RE: Regex = Regex::new(r"^\d{8}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+\d{9,14}$").unwrap();
    static ref OTP_RE: Regex = Regex::new(r"^\d{6}$").unwrap();
}

/// Body of POST /api/verification
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationRequest {
    /// National id, 8 digits
    pub dni: String,
    /// `+` followed by 9 to 14 digits
    pub phone: String,
}

impl VerificationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !DNI_RE.is_match(self.dni.trim()) {
            return Err("dni must be exactly 8 digits".to_string());
        }
        if !PHONE_RE.is_match(self.phone.trim()) {
            return Err("phone must be like +51987654321".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationResponse {
    pub user_id: Uuid,
    pub dni: String,
    pub phone: String,
    pub phone_verified: bool,
    pub status: VerificationStatus,
}

impl From<entrepreneur_verifications::Model> for VerificationResponse {
    fn from(model: entrepreneur_verifications::Model) -> Self {
        Self {
            user_id: model.user_id,
            dni: model.dni,
            phone: model.phone,
            phone_verified: model.phone_verified,
            status: model.status,
        }
    }
}

/// Body of POST /api/verification/otp/verify
#[derive(Debug, Clone, Deserialize)]
pub struct OtpVerifyRequest {
    pub code: String,
}

impl OtpVerifyRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !OTP_RE.is_match(self.code.trim()) {
            return Err("code must be exactly 6 digits".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dni_must_be_eight_digits() {
        let req = VerificationRequest {
            dni: "1234567".to_string(),
            phone: "+51987654321".to_string(),
        };
        assert!(req.validate().is_err());

        let req = VerificationRequest {
            dni: "12345678".to_string(),
            phone: "+51987654321".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn phone_needs_plus_prefix() {
        let req = VerificationRequest {
            dni: "12345678".to_string(),
            phone: "51987654321".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn otp_code_shape() {
        assert!(OtpVerifyRequest {
            code: "123456".to_string()
        }
        .validate()
        .is_ok());
        assert!(OtpVerifyRequest {
            code: "12345".to_string()
        }
        .validate()
        .is_err());
        assert!(OtpVerifyRequest {
            code: "12345a".to_string()
        }
        .validate()
        .is_err());
    }
}
