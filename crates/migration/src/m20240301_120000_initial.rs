use entity::{
    badge, badge_defaults, badge_design, badge_permission, badge_role, badge_role_permissions,
    badge_settings, event, event_admins, helper, helper_shifts, job, shift, users,
};
use sea_orm::EntityTrait;
use sea_orm_migration::{prelude::*, sea_orm::Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_database_backend();
        let schema = Schema::new(db);

        create_entity_table(manager, &schema, users::Entity).await?;
        create_entity_table(manager, &schema, event::Entity).await?;
        create_entity_table(manager, &schema, event_admins::Entity).await?;
        create_entity_table(manager, &schema, job::Entity).await?;
        create_entity_table(manager, &schema, shift::Entity).await?;
        create_entity_table(manager, &schema, helper::Entity).await?;
        create_entity_table(manager, &schema, helper_shifts::Entity).await?;

        create_entity_table(manager, &schema, badge_settings::Entity).await?;
        create_entity_table(manager, &schema, badge_permission::Entity).await?;
        create_entity_table(manager, &schema, badge_role::Entity).await?;
        create_entity_table(manager, &schema, badge_role_permissions::Entity).await?;
        create_entity_table(manager, &schema, badge_design::Entity).await?;
        create_entity_table(manager, &schema, badge_defaults::Entity).await?;
        create_entity_table(manager, &schema, badge::Entity).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_database_backend();
        let schema = Schema::new(db);

        drop_entity_table(manager, &schema, badge::Entity).await?;
        drop_entity_table(manager, &schema, badge_defaults::Entity).await?;
        drop_entity_table(manager, &schema, badge_design::Entity).await?;
        drop_entity_table(manager, &schema, badge_role_permissions::Entity).await?;
        drop_entity_table(manager, &schema, badge_role::Entity).await?;
        drop_entity_table(manager, &schema, badge_permission::Entity).await?;
        drop_entity_table(manager, &schema, badge_settings::Entity).await?;

        drop_entity_table(manager, &schema, helper_shifts::Entity).await?;
        drop_entity_table(manager, &schema, helper::Entity).await?;
        drop_entity_table(manager, &schema, shift::Entity).await?;
        drop_entity_table(manager, &schema, job::Entity).await?;
        drop_entity_table(manager, &schema, event_admins::Entity).await?;
        drop_entity_table(manager, &schema, event::Entity).await?;
        drop_entity_table(manager, &schema, users::Entity).await?;

        Ok(())
    }
}

async fn create_entity_table<'a, E: EntityTrait>(
    manager: &'a SchemaManager<'a>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity))
        .await
}

async fn drop_entity_table<'a, E: EntityTrait>(
    manager: &'a SchemaManager<'a>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let create_stmt = schema.create_table_from_entity(entity);
    let Some(table_name) = create_stmt.get_table_name().cloned() else {
        return Err(DbErr::Migration("entity has no table name".to_owned()));
    };
    manager
        .drop_table(Table::drop().table(table_name).take())
        .await
}
