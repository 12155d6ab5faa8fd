//! Materialized property value slots (§3 `Property`).

use serde_yaml::Value;
use tosca_core::schema::PropertySchema;

use crate::error::ResolveError;
use crate::resolver::{self, Origin};
use crate::topology::Topology;

/// A single materialized value slot: the declared schema plus whatever raw
/// value (if any) the template supplied.
///
/// `Property` borrows its owning [`Topology`] only for the duration of a
/// `.value()` call; it does not outlive it (§3 Ownership).
pub struct Property<'t> {
    pub(crate) name: String,
    pub(crate) schema: PropertySchema,
    pub(crate) raw_value: Option<Value>,
    /// The template this property (or its owning capability/interface
    /// operation) belongs to — needed only to resolve `get_ref_property`,
    /// which walks the *template's* requirements regardless of whether the
    /// property itself came from the node, one of its capabilities, or an
    /// interface operation input (matching the source's `parent` handle).
    pub(crate) parent_template: String,
    pub(crate) topology: &'t Topology,
}

impl<'t> Property<'t> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// The effective value: `None` means "undefined" (no raw value and no
    /// schema default), never an error. Re-evaluated on every call — lazy
    /// per §4.6.
    pub fn value(&self) -> Result<Option<Value>, ResolveError> {
        self.value_at_depth(0)
    }

    pub(crate) fn value_at_depth(&self, depth: u32) -> Result<Option<Value>, ResolveError> {
        match &self.raw_value {
            Some(raw) => resolver::resolve(self.topology, raw, Origin::Template(&self.parent_template), &self.name, depth),
            None => Ok(self.schema.default.clone()),
        }
    }
}
