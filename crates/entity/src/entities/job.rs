use sea_orm::entity::prelude::*;

/// A job of an event, like the bar or the entrance. It contains at least one shift.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "job")]
pub struct Model {
    /// The ID of the job.
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The ID of the related event.
    #[serde(skip)]
    pub event_id: i32,
    /// The name of the job.
    pub name: String,
    /// Is an instruction for the handling of food necessary?
    pub infection_instruction: bool,
    /// The longer description of the job.
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(has_many = "super::shift::Entity")]
    Shift,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::shift::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shift.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
