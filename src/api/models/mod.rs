// Models module - diagram wire types, persisted schema entities and projects

pub mod diagram;
pub mod entities;
pub mod project;

pub use diagram::{
    DiagramColumn, DiagramRelation, DiagramTable, ImportPayload, ImportSummary, RelationType,
};
pub use entities::{Model, ModelColumn, Relation};
pub use project::Project;
