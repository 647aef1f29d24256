#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use k8s_openapi;
pub use kube;

pub mod connection;
pub use connection::{ClusterConnection, Connection};
pub mod dynamic;
pub mod error;
pub use error::{Error, Result};
pub mod id;
pub use id::InstanceId;
pub mod schema;
pub use schema::NamespacedResources;

use kube::{
    Api,
    api::ListParams,
    core::GroupVersionResource,
};
use serde::{Deserialize, Serialize};

use crate::dynamic::DynamicObject;

/// Coordinates of a namespace-scoped listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Namespace to list in.
    pub namespace: String,
    /// API group, empty (or `core`) for the core API.
    pub group: String,
    /// API version.
    pub version: String,
    /// Plural resource name, e.g. `pods`.
    pub resource: String,
}

impl QuerySpec {
    pub fn new(
        namespace: impl Into<String>,
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }

    pub fn gvr(&self) -> GroupVersionResource {
        GroupVersionResource::gvr(&self.group, &self.version, &self.resource)
    }
}

/// Successful result of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Resource names in the order the API server returned them.
    pub resources: Vec<String>,
    pub id: InstanceId,
}

/// Lists the names of all `spec.resource` objects in `spec.namespace`.
///
/// One list request is sent, without selectors or a page limit, so the result
/// is whatever the API server returns for an unfiltered first page. Failures
/// are returned as-is and never retried.
///
/// # Errors
/// [`Error::ClientConstruction`] if `connection` cannot produce a client,
/// [`Error::ApiRequest`] if the list call fails.
pub async fn list_namespaced<C>(spec: &QuerySpec, connection: &C) -> Result<Listing>
where
    C: ClusterConnection + ?Sized,
{
    let gvr = spec.gvr();
    tracing::info!(
        namespace = %spec.namespace,
        group = %gvr.group,
        version = %gvr.version,
        resource = %gvr.resource,
        "listing resources"
    );

    let client = connection.client().map_err(Error::ClientConstruction)?;
    let api: Api<DynamicObject> = Api::namespaced_with(client, &spec.namespace, &gvr);
    let list = api
        .list(&ListParams::default())
        .await
        .map_err(Error::ApiRequest)?;

    let resources: Vec<String> = list
        .items
        .iter()
        .map(|item| item.name_or_empty().to_string())
        .collect();
    let id = InstanceId::from_names(&resources);
    tracing::debug!(count = resources.len(), %id, "listed resources");

    Ok(Listing { resources, id })
}


#[cfg(test)]
mod tests {
    use kube::{Client, Error as KubeError};

    use super::{ClusterConnection, Error, QuerySpec, list_namespaced, mock};

    struct BrokenConnection;

    impl ClusterConnection for BrokenConnection {
        fn client(&self) -> Result<Client, KubeError> {
            Err(KubeError::Service("malformed cluster configuration".into()))
        }
    }

    fn pods() -> QuerySpec {
        QuerySpec::new("default", "", "v1", "pods")
    }

    #[tokio::test]
    async fn lists_names_in_server_order() {
        let (client, server) = mock::testcontext();
        let server = tokio::spawn(server.list(
            "/api/v1/namespaces/default/pods",
            vec![mock::item("a"), mock::item("b")],
        ));

        let listing = list_namespaced(&pods(), &client).await.unwrap();
        server.await.unwrap();

        assert_eq!(listing.resources, vec!["a", "b"]);
        assert_eq!(
            listing.id.as_str(),
            "fb8e20fc2e4c3f248c60c39bd652f3c1347298bb977b8b4d5903b85055620603"
        );
    }

    #[tokio::test]
    async fn empty_namespace_is_a_valid_result() {
        let (client, server) = mock::testcontext();
        let server = tokio::spawn(server.list("/api/v1/namespaces/default/pods", vec![]));

        let listing = list_namespaced(&pods(), &client).await.unwrap();
        server.await.unwrap();

        assert!(listing.resources.is_empty());
        assert_eq!(
            listing.id.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn named_group_path_and_order_sensitivity() {
        let spec = QuerySpec::new("web", "apps", "v1", "deployments");
        let (client, server) = mock::testcontext();
        let server = tokio::spawn(async move {
            server
                .list(
                    "/apis/apps/v1/namespaces/web/deployments",
                    vec![mock::item("api"), mock::item("frontend")],
                )
                .await
                .list(
                    "/apis/apps/v1/namespaces/web/deployments",
                    vec![mock::item("frontend"), mock::item("api")],
                )
                .await
        });

        let first = list_namespaced(&spec, &client).await.unwrap();
        let second = list_namespaced(&spec, &client).await.unwrap();
        server.await.unwrap();

        assert_eq!(first.resources, vec!["api", "frontend"]);
        assert_eq!(second.resources, vec!["frontend", "api"]);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn repeated_reads_are_idempotent() {
        let (client, server) = mock::testcontext();
        let server = tokio::spawn(async move {
            server
                .list("/api/v1/namespaces/default/pods", vec![mock::item("x")])
                .await
                .list("/api/v1/namespaces/default/pods", vec![mock::item("x")])
                .await
        });

        let first = list_namespaced(&pods(), &client).await.unwrap();
        let second = list_namespaced(&pods(), &client).await.unwrap();
        server.await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn api_errors_are_surfaced_verbatim() {
        let (client, server) = mock::testcontext();
        let server = tokio::spawn(server.fail(
            403,
            "Forbidden",
            "pods is forbidden: User \"ci\" cannot list resource \"pods\"",
        ));

        let err = list_namespaced(&pods(), &client).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, Error::ApiRequest(KubeError::Api(_))));
        assert_eq!(err.status_code(), Some(403));
        assert!(err.to_string().contains("cannot list resource"));
    }

    #[tokio::test]
    async fn client_construction_failure() {
        let err = list_namespaced(&pods(), &BrokenConnection).await.unwrap_err();
        assert!(matches!(err, Error::ClientConstruction(_)));
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("malformed cluster configuration"));
    }
}
