use sea_orm::entity::prelude::*;

/// An event helpers can register for.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    /// The ID of the event.
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    /// The identifier of the event used in URLs.
    ///
    /// It only contains the characters `a-zA-Z0-9`.
    #[sea_orm(unique)]
    pub url_name: String,
    /// The name of the event.
    pub name: String,
    /// The text displayed at the beginning of the registration.
    pub text: String,
    /// The text displayed at the bottom of the registration page.
    pub imprint: String,
    /// The text displayed after a successful registration.
    pub registered: String,
    /// The e-mail address used as sender of automatic e-mails.
    pub email: String,
    /// Is the registration opened?
    pub active: bool,
    /// Ask for the t-shirt size during the registration.
    pub ask_shirt: bool,
    /// Ask if the helper is vegetarian.
    pub ask_vegetarian: bool,
    /// Show the current and maximal number of helpers on the registration page.
    pub show_public_numbers: bool,
    /// Is the badge system enabled for this event?
    pub badges: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_admins::Entity")]
    EventAdmins,
    #[sea_orm(has_many = "super::job::Entity")]
    Job,
    #[sea_orm(has_one = "super::badge_settings::Entity")]
    BadgeSettings,
}

impl Related<super::event_admins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventAdmins.def()
    }
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::badge_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BadgeSettings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
