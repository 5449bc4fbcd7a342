use super::m20230501_000002_create_posts::Posts;
use super::m20230501_000003_create_comments::Comments;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20230501_000006_create_post_comment_pivot"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostCommentPivot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostCommentPivot::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostCommentPivot::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostCommentPivot::CommentId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_comment_pivot-post_id")
                            .from(PostCommentPivot::Table, PostCommentPivot::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post_comment_pivot-comment_id")
                            .from(PostCommentPivot::Table, PostCommentPivot::CommentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-post_comment_pivot-pair")
                    .table(PostCommentPivot::Table)
                    .col(PostCommentPivot::PostId)
                    .col(PostCommentPivot::CommentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostCommentPivot::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PostCommentPivot {
    Table,
    Id,
    PostId,
    CommentId,
}
