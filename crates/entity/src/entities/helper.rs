use sea_orm::entity::prelude::*;

use crate::types::{FoodInstruction, ShirtSize};

/// A helper registered in one or more shifts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "helper")]
pub struct Model {
    /// The generated ID of the helper.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub prename: String,
    pub surname: String,
    pub email: String,
    /// The mobile phone number.
    pub phone: String,
    /// An optional comment of the helper.
    pub comment: String,
    /// The t-shirt size.
    pub shirt: ShirtSize,
    pub vegetarian: bool,
    /// The status of the instruction for the handling of food.
    ///
    /// It is null when the helper didn't answer.
    pub infection_instruction: Option<FoodInstruction>,
    /// The UTC date of the registration.
    pub timestamp: DateTime,
}

impl Model {
    /// Returns the first name followed by the last name of the helper.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prename, self.surname)
    }

    /// Returns the short label of the food handling instruction status,
    /// or an empty string if the helper didn't answer.
    pub fn infection_instruction_short(&self) -> &'static str {
        self.infection_instruction
            .map(FoodInstruction::short_label)
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::helper_shifts::Entity")]
    HelperShifts,
    #[sea_orm(has_one = "super::badge::Entity")]
    Badge,
}

impl Related<super::helper_shifts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HelperShifts.def()
    }
}

impl Related<super::badge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Badge.def()
    }
}

impl Related<super::shift::Entity> for Entity {
    fn to() -> RelationDef {
        super::helper_shifts::Relation::Shift.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::helper_shifts::Relation::Helper.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
