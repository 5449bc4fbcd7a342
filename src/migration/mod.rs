use sea_orm_migration::prelude::*;

mod m20230501_000001_create_users;
mod m20230501_000002_create_posts;
mod m20230501_000003_create_comments;
mod m20230501_000004_create_categories;
mod m20230501_000005_create_post_category_pivot;
mod m20230501_000006_create_post_comment_pivot;
mod m20230501_000007_create_tokens;
mod m20230508_000008_create_reset_password_tokens;
mod m20230508_000009_create_admin_user;

pub use m20230508_000009_create_admin_user::{ADMIN_PASSWORD, ADMIN_USERNAME};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230501_000001_create_users::Migration),
            Box::new(m20230501_000002_create_posts::Migration),
            Box::new(m20230501_000003_create_comments::Migration),
            Box::new(m20230501_000004_create_categories::Migration),
            Box::new(m20230501_000005_create_post_category_pivot::Migration),
            Box::new(m20230501_000006_create_post_comment_pivot::Migration),
            Box::new(m20230501_000007_create_tokens::Migration),
            Box::new(m20230508_000008_create_reset_password_tokens::Migration),
            Box::new(m20230508_000009_create_admin_user::Migration),
        ]
    }
}
