use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use sea_orm_migration::prelude::*;

use crate::core::helpers::hash_password;
use crate::entities::user;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20230508_000009_create_admin_user"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let password = hash_password(ADMIN_PASSWORD).map_err(|e| DbErr::Custom(e.to_string()))?;

        user::ActiveModel {
            id: ActiveValue::Set(uuid::Uuid::new_v4()),
            username: ActiveValue::Set(ADMIN_USERNAME.to_string()),
            email: ActiveValue::Set("admin@localhost.local".to_string()),
            password: ActiveValue::Set(password),
            firstname: ActiveValue::Set(Some("Admin".to_string())),
            lastname: ActiveValue::NotSet,
            age: ActiveValue::NotSet,
            gender: ActiveValue::NotSet,
            address: ActiveValue::NotSet,
            website: ActiveValue::NotSet,
        }
        .insert(db)
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        user::Entity::delete_many()
            .filter(user::Column::Username.eq(ADMIN_USERNAME))
            .exec(manager.get_connection())
            .await?;
        Ok(())
    }
}
