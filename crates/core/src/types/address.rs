//! Australian shipping address types.
//!
//! The platform ships to a single country (AU). State codes are a closed
//! set and postal codes are exactly four digits; both are validated at the
//! type boundary so an [`Address`] is well-formed by construction.

use serde::{Deserialize, Serialize};

/// Errors produced when validating an address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required subfield is missing or empty.
    #[error("Address must include street, city, state, and postalCode")]
    MissingField,
    /// The state code is not one of the supported region codes.
    #[error("Invalid state code '{0}'. Must be one of: NSW, VIC, QLD, WA, SA, TAS, ACT, NT")]
    InvalidState(String),
    /// The postal code is not exactly four digits.
    #[error("Invalid postal code. Must be 4 digits (e.g., 2000)")]
    InvalidPostalCode,
}

/// Australian state and territory codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateCode {
    NSW,
    VIC,
    QLD,
    WA,
    SA,
    TAS,
    ACT,
    NT,
}

impl StateCode {
    /// All supported codes.
    pub const ALL: [Self; 8] = [
        Self::NSW,
        Self::VIC,
        Self::QLD,
        Self::WA,
        Self::SA,
        Self::TAS,
        Self::ACT,
        Self::NT,
    ];
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NSW => "NSW",
            Self::VIC => "VIC",
            Self::QLD => "QLD",
            Self::WA => "WA",
            Self::SA => "SA",
            Self::TAS => "TAS",
            Self::ACT => "ACT",
            Self::NT => "NT",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for StateCode {
    type Err = AddressError;

    /// Parse an exact (uppercase) state code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NSW" => Ok(Self::NSW),
            "VIC" => Ok(Self::VIC),
            "QLD" => Ok(Self::QLD),
            "WA" => Ok(Self::WA),
            "SA" => Ok(Self::SA),
            "TAS" => Ok(Self::TAS),
            "ACT" => Ok(Self::ACT),
            "NT" => Ok(Self::NT),
            _ => Err(AddressError::InvalidState(s.to_owned())),
        }
    }
}

/// A four-digit Australian postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a postal code: exactly four ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidPostalCode`] for any other input.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(AddressError::InvalidPostalCode)
        }
    }

    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A validated shipping address. Country is always AU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: StateCode,
    pub postal_code: PostalCode,
    /// Fixed to "AU"; re-stamped on every write regardless of input.
    pub country: String,
}

impl Address {
    /// The single supported country code.
    pub const COUNTRY: &'static str = "AU";

    /// Validate raw address parts into an [`Address`].
    ///
    /// Validation order matches the API contract: missing subfields first,
    /// then state code, then postal code. The country field of the input is
    /// ignored and stamped to AU.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as an [`AddressError`].
    pub fn parse(street: &str, city: &str, state: &str, postal_code: &str) -> Result<Self, AddressError> {
        if street.trim().is_empty() || city.trim().is_empty() {
            return Err(AddressError::MissingField);
        }
        let state: StateCode = state.parse()?;
        let postal_code = PostalCode::parse(postal_code)?;

        Ok(Self {
            street: street.to_owned(),
            city: city.to_owned(),
            state,
            postal_code,
            country: Self::COUNTRY.to_owned(),
        })
    }
}
