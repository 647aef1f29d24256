//! Declaration and state handling of the `kubernetes_namespaced_resources` data source.
//!
//! The host framework validates configuration against [`attributes`] and
//! stores whatever [`NamespacedResources`] publishes. Published values are only
//! replaced after a read fully succeeds.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{ClusterConnection, Error, InstanceId, Listing, QuerySpec, Result, list_namespaced};

/// Value type of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    ListOfString,
}

/// Single attribute of the data source schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub description: &'static str,
    pub required: bool,
    pub computed: bool,
}

impl Attribute {
    const fn input(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            ty: AttributeType::String,
            description,
            required: true,
            computed: false,
        }
    }
}

pub const NAMESPACE: &str = "namespace";
pub const GROUP: &str = "group";
pub const VERSION: &str = "version";
/// Also accepted as `resource`, the key the data source was historically read from.
pub const RESOURCE_NAME: &str = "resource_name";
pub const RESOURCES: &str = "resources";

/// Attributes of the data source, in declaration order.
pub fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::input(NAMESPACE, "namespace to list resource from."),
        Attribute::input(GROUP, "API group to which the resource belongs"),
        Attribute::input(VERSION, "version of the resource"),
        Attribute::input(RESOURCE_NAME, "Name of resource to list"),
        Attribute {
            name: RESOURCES,
            ty: AttributeType::ListOfString,
            description: "List of all resource names in the specified namespace",
            required: false,
            computed: true,
        },
    ]
}

/// Caller configuration as the host framework hands it over.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(deserialize_with = "non_empty")]
    namespace: String,
    group: String,
    #[serde(deserialize_with = "non_empty")]
    version: String,
    #[serde(rename = "resource_name", alias = "resource", deserialize_with = "non_empty")]
    resource: String,
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    if value.is_empty() {
        Err(serde::de::Error::custom("must not be empty"))
    } else {
        Ok(value)
    }
}

impl QuerySpec {
    /// Builds the query from data source configuration.
    ///
    /// `group` may be empty to address the core API. The remaining attributes
    /// are required and must not be empty.
    pub fn from_config(config: &serde_json::Value) -> Result<Self> {
        let raw = RawConfig::deserialize(config).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        Ok(Self {
            namespace: raw.namespace,
            group: raw.group,
            version: raw.version,
            resource: raw.resource,
        })
    }
}

/// Published state of one data source instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacedResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<InstanceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<Vec<String>>,
}

impl NamespacedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the last successful read.
    pub fn id(&self) -> Option<&InstanceId> {
        self.id.as_ref()
    }

    /// Resource names of the last successful read.
    pub fn resources(&self) -> Option<&[String]> {
        self.resources.as_deref()
    }

    /// Reads the data source and publishes its outputs.
    ///
    /// On error the previously published values are left untouched.
    pub async fn read<C>(&mut self, config: &serde_json::Value, connection: &C) -> Result<()>
    where
        C: ClusterConnection + ?Sized,
    {
        let spec = QuerySpec::from_config(config)?;
        let listing = list_namespaced(&spec, connection)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "failed to read namespaced resources"))?;
        self.publish(listing);
        Ok(())
    }

    fn publish(&mut self, listing: Listing) {
        let Listing { resources, id } = listing;
        self.resources = Some(resources);
        self.id = Some(id);
    }
}
