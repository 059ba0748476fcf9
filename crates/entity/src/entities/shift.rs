use sea_orm::entity::prelude::*;

/// A shift of a job.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, serde::Serialize)]
#[sea_orm(table_name = "shift")]
pub struct Model {
    /// The ID of the shift.
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The ID of the related job.
    pub job_id: i32,
    /// The local begin of the shift.
    pub begin: DateTime,
    /// The local end of the shift.
    pub end: DateTime,
    /// The maximal number of helpers. Never negative.
    pub number: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Job,
    #[sea_orm(has_many = "super::helper_shifts::Entity")]
    HelperShifts,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::helper_shifts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HelperShifts.def()
    }
}

impl Related<super::helper::Entity> for Entity {
    fn to() -> RelationDef {
        super::helper_shifts::Relation::Helper.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::helper_shifts::Relation::Shift.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
