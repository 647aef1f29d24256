use std::borrow::Cow;

use kube::{
    Resource,
    api::{ObjectMeta, TypeMeta},
    core::{DynamicResourceScope, GroupVersionResource},
};

/// Note about own `DynamicObject` instead of `kube::api::DynamicObject`.
/// The original `kube::api::DynamicObject` is keyed by `kube::api::ApiResource`,
/// which needs a `kind` next to the plural name. Callers of this crate only know
/// the plural resource name (e.g. `pods`), and resolving the kind would cost a
/// discovery round-trip before every list.
///
/// As a workaround, define own `DynamicObject` that is addressed by
/// [`GroupVersionResource`] alone.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct DynamicObject {
    /// The type fields, not always present
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// All other keys
    #[serde(flatten)]
    pub data: serde_json::Value,
}

impl DynamicObject {
    /// Name of the object, or an empty string when the server omitted it.
    pub fn name_or_empty(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }
}

impl Resource for DynamicObject {
    type DynamicType = GroupVersionResource;
    type Scope = DynamicResourceScope;

    fn group(dt: &GroupVersionResource) -> Cow<'_, str> {
        // NOTE: If the group is "core", return empty string.
        if dt.group == "core" {
            "".into()
        } else {
            dt.group.as_str().into()
        }
    }

    fn version(dt: &GroupVersionResource) -> Cow<'_, str> {
        dt.version.as_str().into()
    }

    /// The kind is unknown without discovery; list responses carry it per item.
    fn kind(_: &GroupVersionResource) -> Cow<'_, str> {
        "".into()
    }

    fn plural(dt: &GroupVersionResource) -> Cow<'_, str> {
        dt.resource.as_str().into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
