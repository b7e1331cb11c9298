//! Repository pattern for paper persistence
//!
//! Papers are looked up by an equality filter on the arXiv id and inserted
//! exactly once; a conflicting insert is ignored because resolved values for
//! the same id are idempotent.

use crate::db::models::{PaperActiveModel, PaperColumn, PaperEntity, PaperRecord};
use crate::db::Db;
use crate::errors::Result;
use crate::models::Paper;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

/// Persistence seam for resolved papers
#[async_trait]
pub trait PaperStore: Send + Sync {
    async fn find_by_arxiv_id(&self, id: &str) -> Result<Option<Paper>>;

    async fn insert(&self, paper: &Paper) -> Result<()>;
}

/// SeaORM-backed paper store
#[derive(Clone)]
pub struct Repository {
    db: Db,
}

impl Repository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaperStore for Repository {
    async fn find_by_arxiv_id(&self, id: &str) -> Result<Option<Paper>> {
        let record = PaperEntity::find()
            .filter(PaperColumn::ArxivId.eq(id))
            .one(self.db.conn())
            .await?;

        record.map(record_to_paper).transpose()
    }

    async fn insert(&self, paper: &Paper) -> Result<()> {
        let record = PaperActiveModel {
            arxiv_id: Set(paper.id.clone()),
            title: Set(paper.title.clone()),
            authors: Set(serde_json::to_value(&paper.authors)?),
            abstract_text: Set(paper.abstract_text.clone()),
            link: Set(paper.link.clone()),
            categories: Set(serde_json::to_value(&paper.categories)?),
            created_at: Set(chrono::Utc::now().into()),
        };

        PaperEntity::insert(record)
            .on_conflict(
                OnConflict::column(PaperColumn::ArxivId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.conn())
            .await?;

        Ok(())
    }
}

fn record_to_paper(record: PaperRecord) -> Result<Paper> {
    Ok(Paper {
        id: record.arxiv_id,
        title: record.title,
        authors: serde_json::from_value(record.authors)?,
        abstract_text: record.abstract_text,
        link: record.link,
        categories: serde_json::from_value(record.categories)?,
    })
}
