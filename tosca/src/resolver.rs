//! The value resolver (§4.6): interprets `get_input`, `get_property`, and
//! `get_ref_property` against a loaded [`Topology`](crate::topology::Topology).
//!
//! Resolution is lazy and pure: each call walks the template graph fresh,
//! bounded by [`ResolverLimits::max_depth`] to reject cycles between
//! deferred functions across properties (§4.6, §5).

use serde_yaml::Value;
use tosca_core::deferred::DeferredCall;

use crate::error::ResolveError;
use crate::topology::Topology;

/// Recursion-depth cap for deferred-function resolution (§5: "recommended
/// limit: 64").
#[derive(Debug, Clone, Copy)]
pub struct ResolverLimits {
    pub max_depth: u32,
}

impl Default for ResolverLimits {
    fn default() -> Self {
        ResolverLimits { max_depth: 64 }
    }
}

/// The entity a resolving property belongs to, used only by
/// `get_ref_property` to find the originating template's requirements.
/// Outputs have no parent template, so `get_ref_property` used from an
/// output position can never succeed — matching the source, where `Output`
/// is not a `Property` and cannot serve as `get_ref_property`'s `self`.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    Template(&'a str),
    Output,
}

impl Origin<'_> {
    fn label(&self) -> String {
        match self {
            Origin::Template(name) => (*name).to_string(),
            Origin::Output => "<output>".to_string(),
        }
    }
}

/// Resolves a single raw value position (a property's, input's, or
/// output's raw content) against `topology`, dispatching deferred functions
/// per §4.6. Literal values (including mappings that don't match one of the
/// three recognized shapes) are returned unchanged: the "embedded deferred
/// function is not re-evaluated" rule in §4.6 falls out naturally, since a
/// nested deferred-looking mapping returned by `get_input` is never itself
/// passed back through `resolve`.
pub(crate) fn resolve(
    topology: &Topology,
    raw: &Value,
    origin: Origin<'_>,
    property_name: &str,
    depth: u32,
) -> Result<Option<Value>, ResolveError> {
    if depth > topology.limits().max_depth {
        return Err(ResolveError::ResolutionCycle {
            limit: topology.limits().max_depth,
        });
    }
    match DeferredCall::parse(raw) {
        None => Ok(Some(raw.clone())),
        Some(DeferredCall::GetInput { name }) => resolve_get_input(topology, &name, origin, property_name),
        Some(DeferredCall::GetProperty { entity, property }) => {
            resolve_get_property(topology, &entity, &property, origin, property_name, depth)
        }
        Some(DeferredCall::GetRefProperty { slot, capability, property }) => {
            resolve_get_ref_property(topology, &slot, capability.as_deref(), &property, origin, depth)
        }
    }
}

fn resolve_get_input(
    topology: &Topology,
    name: &str,
    origin: Origin<'_>,
    property_name: &str,
) -> Result<Option<Value>, ResolveError> {
    let input = topology.get_input(name).ok_or_else(|| ResolveError::UnknownInput {
        name: name.to_string(),
        template: origin.label(),
        property: property_name.to_string(),
    })?;
    Ok(input.value())
}

fn resolve_get_property(
    topology: &Topology,
    entity: &str,
    property: &str,
    origin: Origin<'_>,
    property_name: &str,
    depth: u32,
) -> Result<Option<Value>, ResolveError> {
    let target = topology
        .get_template(entity)
        .map_err(|_| ResolveError::UnknownEntity {
            entity: entity.to_string(),
            template: origin.label(),
            property: property_name.to_string(),
        })?
        .ok_or_else(|| ResolveError::UnknownEntity {
            entity: entity.to_string(),
            template: origin.label(),
            property: property_name.to_string(),
        })?;
    let prop = target.property(property).ok_or_else(|| ResolveError::UnknownProperty {
        entity: entity.to_string(),
        property: property.to_string(),
    })?;
    prop.value_at_depth(depth + 1)
}

fn resolve_get_ref_property(
    topology: &Topology,
    slot: &str,
    capability: Option<&str>,
    property: &str,
    origin: Origin<'_>,
    depth: u32,
) -> Result<Option<Value>, ResolveError> {
    let Origin::Template(template_name) = origin else {
        return Err(ResolveError::UnknownSlot {
            slot: slot.to_string(),
            template: origin.label(),
            property: property.to_string(),
        });
    };
    let slot_err = || ResolveError::UnknownSlot {
        slot: slot.to_string(),
        template: template_name.to_string(),
        property: property.to_string(),
    };
    let source = topology.get_template(template_name).map_err(|_| slot_err())?.ok_or_else(slot_err)?;
    let requirement = source
        .requirements()
        .map_err(|_| slot_err())?
        .into_iter()
        .find(|r| r.name() == slot)
        .ok_or_else(slot_err)?;
    let target = requirement.target().map_err(|_| slot_err())?.ok_or_else(slot_err)?;

    match capability {
        None => {
            let prop = target.property(property).ok_or_else(|| ResolveError::UnknownProperty {
                entity: target.name().to_string(),
                property: property.to_string(),
            })?;
            prop.value_at_depth(depth + 1)
        }
        Some(capability_name) => {
            let cap_err = || ResolveError::UnknownCapabilityProperty {
                capability: capability_name.to_string(),
                property: property.to_string(),
                slot: slot.to_string(),
                target: target.name().to_string(),
                template: template_name.to_string(),
            };
            let cap = target
                .capabilities()
                .map_err(|_| cap_err())?
                .into_iter()
                .find(|c| c.name() == capability_name)
                .ok_or_else(cap_err)?;
            let prop = cap.property(property).ok_or_else(cap_err)?;
            prop.value_at_depth(depth + 1)
        }
    }
}
