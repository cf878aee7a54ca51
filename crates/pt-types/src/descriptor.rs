// crates/pt-types/src/descriptor.rs
//
// Static descriptors built once per plugin load by introspection (spec
// 3, 4.3). These are immutable facts about a plugin; mutable dispatch
// state lives in `InterfaceRuntimeState` (pt-engine, since it owns
// slot arrays that only the rule engine mutates).

use crate::value::ParamType;
use crate::vtable::ArityKind;

#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub type_tag: ParamType,
    pub type_name: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub description: String,
    pub version: String,
    pub arity: ArityKind,
    pub min_params: i32,
    /// `None` means unbounded (the "max may be unbounded" sentinel).
    pub max_params: Option<i32>,
    pub params: Vec<ParamDescriptor>,
}

impl InterfaceDescriptor {
    /// `max_params = min_params` when fixed.
    pub fn fixed(name: impl Into<String>, description: impl Into<String>, version: impl Into<String>, params: Vec<ParamDescriptor>) -> Self {
        let count = params.len() as i32;
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            arity: ArityKind::Fixed,
            min_params: count,
            max_params: Some(count),
            params,
        }
    }

    pub fn variadic(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        min_params: i32,
        max_params: Option<i32>,
        params: Vec<ParamDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            arity: ArityKind::Variadic,
            min_params,
            max_params,
            params,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
    pub path: std::path::PathBuf,
    pub interfaces: Vec<InterfaceDescriptor>,
}
