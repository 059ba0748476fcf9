use sea_orm::entity::prelude::*;

/// The default role and design of the badges of an event, or of one of its jobs.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "badge_defaults")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    /// The ID of the related event.
    #[serde(skip)]
    pub event_id: i32,
    /// The ID of the job, or null for the defaults of the whole event.
    pub job_id: Option<i32>,
    pub role_id: Option<i32>,
    pub design_id: Option<i32>,
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
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Job,
    #[sea_orm(
        belongs_to = "super::badge_role::Entity",
        from = "Column::RoleId",
        to = "super::badge_role::Column::Id",
        on_update = "Restrict",
        on_delete = "SetNull"
    )]
    BadgeRole,
    #[sea_orm(
        belongs_to = "super::badge_design::Entity",
        from = "Column::DesignId",
        to = "super::badge_design::Column::Id",
        on_update = "Restrict",
        on_delete = "SetNull"
    )]
    BadgeDesign,
}

impl ActiveModelBehavior for ActiveModel {}
