use std::fmt;

/// Storage type of a relational column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Json,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// A legacy field copied verbatim (after type coercion) into a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(field: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        Self {
            field,
            column,
            kind,
        }
    }
}

/// A legacy field holding the document id of another entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Field name in the legacy record.
    pub field: &'static str,
    /// Column receiving the translated relational id.
    pub column: &'static str,
    /// Name of the referenced entity type.
    pub references: &'static str,
    /// Required keys skip the record when unresolved; optional keys become NULL.
    pub required: bool,
}

/// Declarative description of one entity type: where its export lives, which
/// table it lands in and how its fields map onto columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    pub name: &'static str,
    pub file: &'static str,
    pub table: &'static str,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub enabled_by_default: bool,
}

impl EntitySpec {
    pub fn new(name: &'static str, file: &'static str, table: &'static str) -> Self {
        Self {
            name,
            file,
            table,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            enabled_by_default: true,
        }
    }

    pub fn column(mut self, field: &'static str, column: &'static str, kind: ColumnKind) -> Self {
        self.columns.push(Column::new(field, column, kind));
        self
    }

    pub fn requires(
        mut self,
        field: &'static str,
        column: &'static str,
        references: &'static str,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            field,
            column,
            references,
            required: true,
        });
        self
    }

    pub fn optional(
        mut self,
        field: &'static str,
        column: &'static str,
        references: &'static str,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            field,
            column,
            references,
            required: false,
        });
        self
    }

    /// Marks the entity type as left out of a run unless explicitly included.
    pub fn disabled_by_default(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    /// Entity types this one depends on, excluding itself.
    pub fn dependencies(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references)
            .filter(move |name| *name != self.name)
    }

    pub fn references(&self, other: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.references == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_columns_and_keys() {
        let spec = EntitySpec::new("comments", "comments.json", "comments")
            .column("body", "body", ColumnKind::Text)
            .requires("userId", "user_id", "users")
            .optional("parentId", "parent_id", "comments")
            .disabled_by_default();

        assert_eq!(spec.columns.len(), 1);
        assert_eq!(spec.foreign_keys.len(), 2);
        assert!(!spec.enabled_by_default);
        assert!(spec.foreign_keys[0].required);
        assert!(!spec.foreign_keys[1].required);
    }

    #[test]
    fn test_dependencies_skip_self_references() {
        let spec = EntitySpec::new("comments", "comments.json", "comments")
            .requires("userId", "user_id", "users")
            .optional("parentId", "parent_id", "comments");

        let deps: Vec<_> = spec.dependencies().collect();
        assert_eq!(deps, vec!["users"]);
        assert!(spec.references("comments"));
        assert!(!spec.references("links"));
    }
}
