use sea_orm::entity::prelude::*;

/// The association between badge roles and the permissions they grant.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "badge_role_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub permission_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::badge_role::Entity",
        from = "Column::RoleId",
        to = "super::badge_role::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    BadgeRole,
    #[sea_orm(
        belongs_to = "super::badge_permission::Entity",
        from = "Column::PermissionId",
        to = "super::badge_permission::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    BadgePermission,
}

impl Related<super::badge_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BadgeRole.def()
    }
}

impl Related<super::badge_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BadgePermission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
