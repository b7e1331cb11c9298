//! SeaORM entity models

pub mod paper;

pub use paper::{
    ActiveModel as PaperActiveModel, Column as PaperColumn, Entity as PaperEntity,
    Model as PaperRecord,
};
