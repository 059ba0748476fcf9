use sea_orm::entity::prelude::*;

/// The graphical design of a badge.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "badge_design")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The ID of the related event.
    #[serde(skip)]
    pub event_id: i32,
    pub name: String,
    /// The font color, as 6 hexadecimal digits without the leading `#`.
    pub font_color: String,
    /// The path to the background image of the front side, relative to the media root.
    pub bg_front: Option<String>,
    /// The path to the background image of the back side, relative to the media root.
    pub bg_back: Option<String>,
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
