use super::m20230501_000002_create_posts::Posts;
use super::m20230501_000004_create_categories::Categories;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20230501_000005_create_post_category_pivot"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostCategoryPivot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostCategoryPivot::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostCategoryPivot::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostCategoryPivot::CategoryId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_category_pivot-post_id")
                            .from(PostCategoryPivot::Table, PostCategoryPivot::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_category_pivot-category_id")
                            .from(PostCategoryPivot::Table, PostCategoryPivot::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-post_category_pivot-pair")
                    .table(PostCategoryPivot::Table)
                    .col(PostCategoryPivot::PostId)
                    .col(PostCategoryPivot::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostCategoryPivot::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PostCategoryPivot {
    Table,
    Id,
    PostId,
    CategoryId,
}
