use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;

/// The t-shirt sizes a helper can choose.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShirtSize {
    #[default]
    #[sea_orm(string_value = "S")]
    S,
    #[sea_orm(string_value = "M")]
    M,
    #[sea_orm(string_value = "L")]
    L,
    #[sea_orm(string_value = "XL")]
    Xl,
    #[sea_orm(string_value = "XXL")]
    Xxl,
    #[sea_orm(string_value = "S_GIRLY")]
    SGirly,
    #[sea_orm(string_value = "M_GIRLY")]
    MGirly,
    #[sea_orm(string_value = "L_GIRLY")]
    LGirly,
    #[sea_orm(string_value = "XL_GIRLY")]
    XlGirly,
}

impl ShirtSize {
    /// Returns the label displayed to the users and in the exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "XXL",
            Self::SGirly => "S (girly)",
            Self::MGirly => "M (girly)",
            Self::LGirly => "L (girly)",
            Self::XlGirly => "XL (girly)",
        }
    }
}

impl fmt::Display for ShirtSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown t-shirt size `{0}`")]
pub struct ShirtSizeParseError(String);

impl FromStr for ShirtSize {
    type Err = ShirtSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Self::S),
            "M" => Ok(Self::M),
            "L" => Ok(Self::L),
            "XL" => Ok(Self::Xl),
            "XXL" => Ok(Self::Xxl),
            "S_GIRLY" => Ok(Self::SGirly),
            "M_GIRLY" => Ok(Self::MGirly),
            "L_GIRLY" => Ok(Self::LGirly),
            "XL_GIRLY" => Ok(Self::XlGirly),
            other => Err(ShirtSizeParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ShirtSize;

    #[test]
    fn parse_girly() {
        assert_eq!(Ok(ShirtSize::MGirly), "M_GIRLY".parse());
        assert_eq!(ShirtSize::MGirly.to_string(), "M (girly)");
    }

    #[test]
    fn parse_unknown() {
        assert!("XXXL".parse::<ShirtSize>().is_err());
    }
}
