use sea_orm::entity::prelude::*;

/// The badge configuration of an event.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "badge_settings")]
pub struct Model {
    /// The ID of the related event.
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(skip)]
    pub event_id: i32,
    /// The path to a custom LaTeX template, relative to the media root.
    ///
    /// If null, the default template is used.
    pub latex_template: Option<String>,
    /// Are barcodes printed on the badges and scanned at the check-in?
    pub barcodes: bool,
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
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
