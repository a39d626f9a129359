//! Tunisian mobile numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Tunisia's international dialing prefix.
pub const COUNTRY_CODE: &str = "216";

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    #[error("phone number cannot be empty")]
    Empty,
    #[error("phone number must have 8 digits, got {0}")]
    WrongLength(usize),
}

/// A Tunisian phone number, stored as its 8 local digits.
///
/// Parsing strips everything that is not a digit and drops a leading `216`
/// when the number is longer than 8 digits, so `+216 22 345 678`,
/// `21622345678` and `22-345-678` all parse to `22345678`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const LOCAL_DIGITS: usize = 8;

    /// # Errors
    ///
    /// Returns an error if no digits remain or the local part is not 8 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        let local = match digits.strip_prefix(COUNTRY_CODE) {
            Some(rest) if digits.len() > Self::LOCAL_DIGITS => rest,
            _ => digits.as_str(),
        };

        if local.len() != Self::LOCAL_DIGITS {
            return Err(PhoneError::WrongLength(local.len()));
        }

        Ok(Self(local.to_owned()))
    }

    /// The 8 local digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `216` followed by the local digits, as SMS gateways expect.
    #[must_use]
    pub fn international(&self) -> String {
        format!("{COUNTRY_CODE}{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<String as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_number() {
        assert_eq!(PhoneNumber::parse("22345678").unwrap().as_str(), "22345678");
        assert_eq!(PhoneNumber::parse("22 345 678").unwrap().as_str(), "22345678");
    }

    #[test]
    fn test_parse_drops_country_code() {
        assert_eq!(PhoneNumber::parse("+216 22 345 678").unwrap().as_str(), "22345678");
        assert_eq!(PhoneNumber::parse("21622345678").unwrap().as_str(), "22345678");
    }

    #[test]
    fn test_local_number_starting_with_216_is_kept() {
        // 8 digits that happen to begin with 216 are a local number
        assert_eq!(PhoneNumber::parse("21612345").unwrap().as_str(), "21612345");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(PhoneNumber::parse("12345"), Err(PhoneError::WrongLength(5)));
        assert_eq!(
            PhoneNumber::parse("0021622345678"),
            Err(PhoneError::WrongLength(13))
        );
        assert_eq!(PhoneNumber::parse("abc"), Err(PhoneError::Empty));
    }

    #[test]
    fn test_international_form() {
        let phone = PhoneNumber::parse("98 765 432").unwrap();
        assert_eq!(phone.international(), "21698765432");
    }
}
