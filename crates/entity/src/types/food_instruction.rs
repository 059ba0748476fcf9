use sea_orm::entity::prelude::*;

/// The status of the instruction for the handling of food of a helper.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum FoodInstruction {
    /// The helper never got an instruction.
    #[sea_orm(string_value = "No")]
    No,
    /// The helper has a valid instruction.
    #[sea_orm(string_value = "Yes")]
    Yes,
    /// The helper got an instruction by a doctor, it must be refreshed.
    #[sea_orm(string_value = "Refresh")]
    Refresh,
}

impl FoodInstruction {
    /// Returns the label shown in the registration form.
    pub fn label(self) -> &'static str {
        match self {
            Self::No => "I never got an instruction",
            Self::Yes => "I have a valid instruction",
            Self::Refresh => "I got a instruction by a doctor, it must be refreshed",
        }
    }

    /// Returns the short label shown in the lists and exports.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Yes => "Valid",
            Self::Refresh => "Refreshment",
        }
    }
}
