//! Post entity for SeaORM.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use quill_core::domain::NewPost;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            author: model.author,
            view_count: model.view_count,
            is_deleted: model.is_deleted,
            created_at: model.created_at.into(),
        }
    }
}

/// Conversion from an insert request to a SeaORM ActiveModel. The id is
/// left to the store; the creation timestamp is stamped here.
impl From<NewPost> for ActiveModel {
    fn from(input: NewPost) -> Self {
        Self {
            id: NotSet,
            title: Set(input.title),
            content: Set(input.content),
            author: Set(input.author),
            view_count: Set(0),
            is_deleted: Set(false),
            created_at: Set(Utc::now().into()),
        }
    }
}
