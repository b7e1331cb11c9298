//! Paper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    /// arXiv identifier; papers are immutable once written
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub arxiv_id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Author names in publication order, as JSONB
    #[sea_orm(column_type = "JsonBinary")]
    pub authors: Json,

    #[sea_orm(column_type = "Text")]
    pub abstract_text: String,

    #[sea_orm(column_type = "Text")]
    pub link: String,

    /// Taxonomy codes in feed order, as JSONB
    #[sea_orm(column_type = "JsonBinary")]
    pub categories: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
