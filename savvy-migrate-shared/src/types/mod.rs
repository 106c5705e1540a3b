mod entity;
mod legacy_record;
mod row;

pub use entity::{Column, ColumnKind, EntitySpec, ForeignKey};
pub use legacy_record::{LEGACY_ID_FIELD, LegacyRecord, legacy_id_of};
pub use row::{ColumnValue, NewRow};
