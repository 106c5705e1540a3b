//! This module builds the ordered list of phases a migration run executes.
//!
//! The included entity types are sorted topologically by their declared
//! foreign keys (Kahn's algorithm). Ties are broken by catalog declaration
//! order, so a catalog that is already declared in dependency order plans to
//! exactly that order.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use savvy_migrate_shared::types::EntitySpec;
use tracing::warn;

use crate::errors::PlanError;

/// Which entity types of the catalog take part in a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySelection {
    /// Replaces the catalog's default set when present.
    pub include: Option<Vec<String>>,
    /// Removed from the included set.
    pub exclude: Vec<String>,
}

impl EntitySelection {
    /// The catalog's default set: every entity type enabled by default.
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Exactly the given entity types.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: Some(names.into_iter().map(Into::into).collect()),
            exclude: Vec::new(),
        }
    }

    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }
}

/// One step of a run: migrate every record of one entity type.
#[derive(Debug, Clone)]
pub struct Phase {
    pub spec: EntitySpec,
    pub path: PathBuf,
    /// Whether some included entity type (possibly this one) references this
    /// one, i.e. whether its new ids must be recorded in the identifier map.
    pub is_reference_target: bool,
    /// Optional foreign keys whose target type is excluded from the run; they
    /// are always stored as NULL.
    pub unavailable_references: Vec<&'static str>,
}

/// Ordered phases of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    phases: Vec<Phase>,
}

impl MigrationPlan {
    /// Builds a plan from a catalog and a selection.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Every known entity type, in declaration order
    /// * `selection` - Which entity types take part in this run
    /// * `export_dir` - Directory holding one export file per entity type
    ///
    /// # Returns
    ///
    /// The ordered plan, or a `PlanError` describing the first inconsistency
    /// found in the catalog or the selection.
    pub fn build(
        catalog: &[EntitySpec],
        selection: &EntitySelection,
        export_dir: &Path,
    ) -> Result<Self, PlanError> {
        let index_of = validate_catalog(catalog)?;
        let included = resolve_selection(catalog, selection, &index_of)?;

        let mut unavailable: HashMap<usize, Vec<&'static str>> = HashMap::new();
        for &index in &included {
            let spec = &catalog[index];
            for fk in spec.foreign_keys.iter().filter(|fk| fk.references != spec.name) {
                if included.contains(&index_of[fk.references]) {
                    continue;
                }
                if fk.required {
                    return Err(PlanError::MissingDependency {
                        entity: spec.name.to_string(),
                        field: fk.field.to_string(),
                        dependency: fk.references.to_string(),
                    });
                }
                warn!(
                    entity = spec.name,
                    field = fk.field,
                    dependency = fk.references,
                    "Optional reference target excluded from this run; values will be NULL"
                );
                unavailable.entry(index).or_default().push(fk.field);
            }
        }

        let order = topological_order(catalog, &included, &index_of)?;

        let phases = order
            .into_iter()
            .map(|index| {
                let spec = &catalog[index];
                let is_reference_target = included
                    .iter()
                    .any(|&other| catalog[other].references(spec.name));
                Phase {
                    spec: spec.clone(),
                    path: export_dir.join(spec.file),
                    is_reference_target,
                    unavailable_references: unavailable.remove(&index).unwrap_or_default(),
                }
            })
            .collect();

        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Entity type names in execution order.
    pub fn entity_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|phase| phase.spec.name).collect()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

/// Checks names are unique and every foreign key targets a catalog entry.
fn validate_catalog(catalog: &[EntitySpec]) -> Result<HashMap<&'static str, usize>, PlanError> {
    let mut index_of = HashMap::with_capacity(catalog.len());
    for (index, spec) in catalog.iter().enumerate() {
        if index_of.insert(spec.name, index).is_some() {
            return Err(PlanError::DuplicateEntity(spec.name.to_string()));
        }
    }

    for spec in catalog {
        for fk in &spec.foreign_keys {
            if !index_of.contains_key(fk.references) {
                return Err(PlanError::UnknownEntity {
                    entity: spec.name.to_string(),
                    field: fk.field.to_string(),
                    references: fk.references.to_string(),
                });
            }
            if fk.references == spec.name && fk.required {
                return Err(PlanError::RequiredSelfReference {
                    entity: spec.name.to_string(),
                    field: fk.field.to_string(),
                });
            }
        }
    }

    Ok(index_of)
}

fn resolve_selection(
    catalog: &[EntitySpec],
    selection: &EntitySelection,
    index_of: &HashMap<&'static str, usize>,
) -> Result<HashSet<usize>, PlanError> {
    let lookup = |name: &String| {
        index_of
            .get(name.as_str())
            .copied()
            .ok_or_else(|| PlanError::UnknownSelection(name.clone()))
    };

    let mut included: HashSet<usize> = match &selection.include {
        Some(names) => names.iter().map(lookup).collect::<Result<_, _>>()?,
        None => catalog
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.enabled_by_default)
            .map(|(index, _)| index)
            .collect(),
    };

    for name in &selection.exclude {
        included.remove(&lookup(name)?);
    }

    Ok(included)
}

/// Kahn's algorithm over the included entity types, ignoring self-references.
fn topological_order(
    catalog: &[EntitySpec],
    included: &HashSet<usize>,
    index_of: &HashMap<&'static str, usize>,
) -> Result<Vec<usize>, PlanError> {
    let mut in_degree: HashMap<usize, usize> = HashMap::with_capacity(included.len());
    let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();

    for &index in included {
        let dependencies: BTreeSet<usize> = catalog[index]
            .dependencies()
            .map(|name| index_of[name])
            .filter(|dependency| included.contains(dependency))
            .collect();
        in_degree.insert(index, dependencies.len());
        for dependency in dependencies {
            dependents.entry(dependency).or_default().push(index);
        }
    }

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| *index)
        .collect();
    let mut order = Vec::with_capacity(included.len());

    while let Some(index) = ready.pop_first() {
        order.push(index);
        for dependent in dependents.get(&index).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() < included.len() {
        let mut remaining: Vec<usize> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(index, _)| index)
            .collect();
        remaining.sort_unstable();
        return Err(PlanError::UnresolvableDependencies(
            remaining
                .into_iter()
                .map(|index| catalog[index].name.to_string())
                .collect(),
        ));
    }

    Ok(order)
}
