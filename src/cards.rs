//! Card number handling: Luhn validation on the way in, masking on the way
//! out.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::masking::{Secret, Strategy, WithType};

#[derive(Debug, thiserror::Error)]
#[error("not a valid credit card number")]
pub struct CardValidationError;

/// Card number
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CardNumber(Secret<String, CardNumberStrategy>);

impl FromStr for CardNumber {
    type Err = CardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: String = s.split_whitespace().collect();
        match luhn::valid(&number) {
            true => Ok(Self(Secret::new(number))),
            false => Err(CardValidationError),
        }
    }
}

impl TryFrom<String> for CardNumber {
    type Error = CardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl<'de> Deserialize<'de> for CardNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub enum CardNumberStrategy {}

impl<T> Strategy<T> for CardNumberStrategy
where
    T: AsRef<str>,
{
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val_str: &str = val.as_ref();

        if val_str.len() < 15 || val_str.len() > 19 {
            return WithType::fmt(val, f);
        }

        write!(
            f,
            "{}{}",
            &val_str[..6],
            "*".repeat(val_str.len() - 6)
        )
    }
}
