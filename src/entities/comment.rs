use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A named comment that can be attached to any number of posts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_comment::Entity")]
    PostComment,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_comment::Relation::Post.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_comment::Relation::Comment.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
