use sea_orm::entity::prelude::*;

/// The badge of a helper.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "badge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The ID of the helper owning this badge.
    #[sea_orm(unique)]
    pub helper_id: Uuid,
    /// The number encoded in the barcode printed on the badge.
    #[sea_orm(unique)]
    pub barcode: i32,
    /// Was the badge already printed and handed to the helper?
    pub printed: bool,
    /// The job printed on the badge, when the helper has several jobs.
    pub primary_job_id: Option<i32>,
    /// A role overriding the defaults of the job and the event.
    pub role_id: Option<i32>,
    /// A design overriding the defaults of the job and the event.
    pub design_id: Option<i32>,
    /// The path to the photo of the helper, relative to the media root.
    pub photo: Option<String>,
    /// A first name replacing the one of the helper.
    pub firstname: Option<String>,
    /// A last name replacing the one of the helper.
    pub surname: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::helper::Entity",
        from = "Column::HelperId",
        to = "super::helper::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Helper,
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::PrimaryJobId",
        to = "super::job::Column::Id",
        on_update = "Restrict",
        on_delete = "SetNull"
    )]
    PrimaryJob,
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

impl Related<super::helper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Helper.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
