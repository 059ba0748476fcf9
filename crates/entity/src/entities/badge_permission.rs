use sea_orm::entity::prelude::*;

/// A permission that can be printed on a badge, like the access to the backstage.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "badge_permission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The ID of the related event.
    #[serde(skip)]
    pub event_id: i32,
    pub name: String,
    /// The name used in the LaTeX template. The prefix `perm-` is added to it.
    pub latex_name: String,
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
    #[sea_orm(has_many = "super::badge_role_permissions::Entity")]
    BadgeRolePermissions,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::badge_role::Entity> for Entity {
    fn to() -> RelationDef {
        super::badge_role_permissions::Relation::BadgeRole.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::badge_role_permissions::Relation::BadgePermission.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
