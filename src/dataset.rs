//! Datasets.
//!
//! A [`Dataset`] is a flat Zarr V2 group: an ordered collection of named [`Variable`]s, group attributes, and a stable identity.
//! The identity namespaces the cache keys of a dataset, so a new identity invalidates everything cached for a dataset.
//!
//! [`DatasetMetadata`] derives the Zarr V2 metadata documents of a dataset.

mod dataset_metadata;

pub use dataset_metadata::{
    DatasetMetadata, VariableMetadata, ARRAY_DIMENSIONS_ATTR_KEY, ARRAY_METADATA_KEY,
    ATTRIBUTES_KEY, CONSOLIDATED_METADATA_KEY, GROUP_METADATA_KEY,
};

use std::collections::HashSet;

use thiserror::Error;

use crate::{array::Variable, metadata::Attributes};

/// The attribute key holding the identity of a dataset.
///
/// It is injected into the dataset attributes and stripped from every `.zattrs` document.
pub const DATASET_ID_ATTR_KEY: &str = "_zarrs_serve_id";

/// A dataset creation error.
#[derive(Debug, Error)]
pub enum DatasetCreateError {
    /// More than one variable has the same name.
    #[error("duplicate variable name {_0:?}")]
    DuplicateVariableName(String),
    /// The identity is empty.
    #[error("dataset identity must not be empty")]
    EmptyIdentity,
}

/// A dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    identity: String,
    variables: Vec<Variable>,
    attributes: Attributes,
}

impl Dataset {
    /// Create a new [`DatasetBuilder`].
    #[must_use]
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Return the identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Return the variables in insertion order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Return the variable named `name`, if it exists.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name() == name)
    }

    /// Return the group attributes, including the [identity attribute](DATASET_ID_ATTR_KEY).
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A [`Dataset`] builder.
///
/// The identity defaults to a random UUID v4.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    /// The variables.
    pub variables: Vec<Variable>,
    /// The group attributes.
    pub attributes: Attributes,
    /// The identity, generated if [`None`].
    pub identity: Option<String>,
}

impl DatasetBuilder {
    /// Create a new dataset builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn variable(&mut self, variable: Variable) -> &mut Self {
        self.variables.push(variable);
        self
    }

    /// Add variables.
    pub fn variables(&mut self, variables: impl IntoIterator<Item = Variable>) -> &mut Self {
        self.variables.extend(variables);
        self
    }

    /// Set the group attributes.
    pub fn attributes(&mut self, attributes: Attributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Set the identity.
    pub fn identity(&mut self, identity: impl Into<String>) -> &mut Self {
        self.identity = Some(identity.into());
        self
    }

    /// Build into a [`Dataset`].
    ///
    /// # Errors
    /// Returns a [`DatasetCreateError`] if two variables share a name or the identity is empty.
    pub fn build(&self) -> Result<Dataset, DatasetCreateError> {
        let mut names = HashSet::with_capacity(self.variables.len());
        for variable in &self.variables {
            if !names.insert(variable.name()) {
                return Err(DatasetCreateError::DuplicateVariableName(
                    variable.name().to_string(),
                ));
            }
        }

        let identity = self
            .identity
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if identity.is_empty() {
            return Err(DatasetCreateError::EmptyIdentity);
        }

        let mut attributes = self.attributes.clone();
        if let Some(previous) = attributes.get(DATASET_ID_ATTR_KEY) {
            if previous.as_str() != Some(identity.as_str()) {
                log::warn!(
                    "dataset attribute {DATASET_ID_ATTR_KEY} {previous} replaced by identity {identity}"
                );
            }
        }
        attributes.insert(
            DATASET_ID_ATTR_KEY.to_string(),
            serde_json::Value::String(identity.clone()),
        );

        Ok(Dataset {
            identity,
            variables: self.variables.clone(),
            attributes,
        })
    }
}
