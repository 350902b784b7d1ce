pub mod import_kind;
pub mod schema;

pub use import_kind::ImportKind;
pub use schema::{FieldCheck, FieldRule, ImportSchema, Severity};
