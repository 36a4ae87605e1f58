//! Gridded fields and their identifying metadata
//!
//! A [`GridField`] is a two-dimensional array of values on a fixed grid together with
//! the metadata a gridded-data file would carry: a short name identifying the physical
//! quantity, a numeric parameter identifier, and any further attributes (dates, grid
//! geometry) that are passed through untouched when a field is derived from another.
//!
//! ```rust
//! use gfas_core::grid::{AttributeValue, GridField, GridMetadata};
//! use ndarray::array;
//!
//! let dm = GridField::new(GridMetadata::new("crfire", Some(210092)), array![[1.0, 2.0]]);
//! let co = dm.derive("cofire", "CO flux", array![[0.1, 0.2]]).unwrap();
//!
//! assert_eq!(co.attribute("shortName"), Some(AttributeValue::Str("cofire".to_string())));
//! assert_eq!(co.param_id(), None);
//! ```

use crate::errors::{GfasError, GfasResult};
use crate::FloatValue;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a metadata attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Float(FloatValue),
    Str(String),
}

/// Metadata identifying a gridded field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    /// Short name of the physical quantity (e.g. `"crfire"`)
    pub short_name: String,
    /// Numeric parameter identifier, if the quantity has one
    pub param_id: Option<i64>,
    /// Descriptive name
    #[serde(default)]
    pub name: String,
    /// Other attributes carried along with the field
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl GridMetadata {
    pub fn new(short_name: impl Into<String>, param_id: Option<i64>) -> Self {
        Self {
            short_name: short_name.into(),
            param_id,
            name: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an extra attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// A two-dimensional field of values with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridField {
    metadata: GridMetadata,
    values: Array2<FloatValue>,
}

impl GridField {
    pub fn new(metadata: GridMetadata, values: Array2<FloatValue>) -> Self {
        Self { metadata, values }
    }

    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    pub fn short_name(&self) -> &str {
        &self.metadata.short_name
    }

    pub fn param_id(&self) -> Option<i64> {
        self.metadata.param_id
    }

    pub fn values(&self) -> &Array2<FloatValue> {
        &self.values
    }

    /// Shape of the grid as (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Look up a scalar attribute by its key
    ///
    /// `shortName`, `paramId` and `name` address the identifying metadata; any other key
    /// is looked up among the extra attributes.
    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        match key {
            "shortName" => Some(AttributeValue::Str(self.metadata.short_name.clone())),
            "paramId" => self.metadata.param_id.map(AttributeValue::Int),
            "name" => Some(AttributeValue::Str(self.metadata.name.clone())),
            _ => self.metadata.attributes.get(key).cloned(),
        }
    }

    /// Replace the values, keeping the metadata
    ///
    /// The new values must have the same shape as the grid.
    pub fn set_values(&mut self, values: Array2<FloatValue>) -> GfasResult<()> {
        if values.dim() != self.values.dim() {
            return Err(GfasError::InputValidation(format!(
                "values of shape {:?} do not fit grid {:?} of shape {:?}",
                values.dim(),
                self.metadata.short_name,
                self.values.dim()
            )));
        }
        self.values = values;
        Ok(())
    }

    /// Create a new field on the same grid for a different quantity
    ///
    /// Extra attributes are carried over. The parameter identifier belongs to the source
    /// quantity and is not.
    pub fn derive(
        &self,
        short_name: impl Into<String>,
        name: impl Into<String>,
        values: Array2<FloatValue>,
    ) -> GfasResult<GridField> {
        let metadata = GridMetadata {
            short_name: short_name.into(),
            param_id: None,
            name: name.into(),
            attributes: self.metadata.attributes.clone(),
        };
        let mut field = GridField {
            metadata,
            values: Array2::zeros(self.values.raw_dim()),
        };
        field.set_values(values)?;
        Ok(field)
    }
}
