use sea_orm::entity::prelude::*;

/// A user of the administration interface.
///
/// Users are authenticated upstream, the service only knows their username.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// The ID of the user.
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The username, as sent by the authentication proxy.
    #[sea_orm(unique)]
    pub username: String,
    /// A superuser is admin of every event.
    pub is_superuser: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_admins::Entity")]
    EventAdmins,
}

impl Related<super::event_admins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventAdmins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
