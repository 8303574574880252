//! Buyer company profile.
//!
//! The profile is copied onto every order at submission time, so later
//! profile edits never change historical orders or their documents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::BuyerId;

/// Country used when a buyer has not set one.
pub const DEFAULT_COUNTRY: &str = "NL";

/// Company and contact details of a wholesale buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub buyer_id: BuyerId,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    /// Chamber of commerce (KvK) registration number.
    pub kvk_number: Option<String>,
    /// VAT (BTW) number.
    pub btw_number: Option<String>,
}

impl BuyerProfile {
    /// Empty profile for a buyer who has not filled in any details yet.
    #[must_use]
    pub fn blank(buyer_id: BuyerId, email: impl Into<String>) -> Self {
        Self {
            buyer_id,
            company_name: String::new(),
            contact_name: String::new(),
            email: email.into(),
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            country: DEFAULT_COUNTRY.to_owned(),
            kvk_number: None,
            btw_number: None,
        }
    }

    /// Check the fields an order snapshot cannot do without.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field.
    pub fn ensure_orderable(&self) -> Result<(), ProfileError> {
        if self.company_name.trim().is_empty() {
            return Err(ProfileError::MissingField("company_name"));
        }
        if self.contact_name.trim().is_empty() {
            return Err(ProfileError::MissingField("contact_name"));
        }
        if self.email.trim().is_empty() {
            return Err(ProfileError::MissingField("email"));
        }
        Ok(())
    }
}

/// Buyer-editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub kvk_number: Option<String>,
    #[serde(default)]
    pub btw_number: Option<String>,
}

impl ProfileUpdate {
    /// Normalize the update into a full profile for `buyer_id`.
    ///
    /// Blank optional fields become `None` and a missing country falls back
    /// to [`DEFAULT_COUNTRY`].
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingField`] if the company name, contact
    /// name or email is blank.
    pub fn into_profile(self, buyer_id: BuyerId) -> Result<BuyerProfile, ProfileError> {
        let profile = BuyerProfile {
            buyer_id,
            company_name: self.company_name.trim().to_owned(),
            contact_name: self.contact_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            city: non_blank(self.city),
            postal_code: non_blank(self.postal_code),
            country: non_blank(self.country)
                .map_or_else(|| DEFAULT_COUNTRY.to_owned(), |c| c.to_uppercase()),
            kvk_number: non_blank(self.kvk_number),
            btw_number: non_blank(self.btw_number),
        };
        profile.ensure_orderable()?;
        Ok(profile)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Profile validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile field `{0}` is required")]
    MissingField(&'static str),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn update() -> ProfileUpdate {
        ProfileUpdate {
            company_name: " Schoenhandel B.V. ".to_owned(),
            contact_name: "Sam de Vries".to_owned(),
            email: "inkoop@schoenhandel.nl".to_owned(),
            phone: Some("   ".to_owned()),
            city: Some("Utrecht".to_owned()),
            country: None,
            ..ProfileUpdate::default()
        }
    }

    #[test]
    fn test_into_profile_normalizes() {
        let profile = update().into_profile(BuyerId::random()).unwrap();
        assert_eq!(profile.company_name, "Schoenhandel B.V.");
        assert_eq!(profile.phone, None);
        assert_eq!(profile.city.as_deref(), Some("Utrecht"));
        assert_eq!(profile.country, DEFAULT_COUNTRY);
    }

    #[test]
    fn test_into_profile_requires_company() {
        let mut u = update();
        u.company_name = String::new();
        assert_eq!(
            u.into_profile(BuyerId::random()),
            Err(ProfileError::MissingField("company_name"))
        );
    }

    #[test]
    fn test_blank_profile_not_orderable() {
        let profile = BuyerProfile::blank(BuyerId::random(), "a@b.nl");
        assert!(profile.ensure_orderable().is_err());
        assert_eq!(profile.country, "NL");
    }
}
