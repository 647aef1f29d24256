use anyhow::Context;
use kube::{
    Client, Config,
    config::{KubeConfigOptions, Kubeconfig},
};

/// Handle to an already authenticated cluster, borrowed for the duration of one read.
///
/// Each read asks the handle for a client and drops it afterwards, so
/// implementations must not hand out clients bound to shared mutable state.
pub trait ClusterConnection {
    /// Builds a client able to address arbitrary group/version/resource triples.
    fn client(&self) -> Result<Client, kube::Error>;
}

impl ClusterConnection for Config {
    fn client(&self) -> Result<Client, kube::Error> {
        Client::try_from(self.clone())
    }
}

impl ClusterConnection for Client {
    fn client(&self) -> Result<Client, kube::Error> {
        Ok(self.clone())
    }
}

/// Shared provider-level connection configuration.
///
/// Keeps the resolved context and its default namespace next to the
/// [`Config`] used to build clients.
#[derive(Debug, Clone)]
pub struct Connection {
    config: Config,
    context: Option<String>,
    namespace: Option<String>,
}

impl Connection {
    /// Loads the connection from the local kubeconfig.
    ///
    /// Context determination follows this priority:
    /// 1. Uses the context if explicitly specified.
    /// 2. Uses the current context from the kubeconfig file.
    ///
    /// # Errors
    /// Returns an error if the kubeconfig file cannot be read, no context is
    /// selected, or the selected context cannot be turned into a client config.
    pub async fn from_kubeconfig(context: Option<&str>) -> anyhow::Result<Self> {
        let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;
        let context = determine_context(context, &kubeconfig)?;
        let namespace = context_namespace(&kubeconfig, &context);

        let options = KubeConfigOptions {
            context: Some(context.clone()),
            ..Default::default()
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .with_context(|| format!("Failed to load kubeconfig context {context:?}"))?;

        Ok(Self {
            config,
            context: Some(context),
            namespace,
        })
    }

    /// Infers the connection the way `kube` does: kubeconfig first, then the
    /// in-cluster service account.
    pub async fn infer() -> anyhow::Result<Self> {
        let config = Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?;
        let namespace = Some(config.default_namespace.clone());
        Ok(Self {
            config,
            context: None,
            namespace,
        })
    }

    /// Name of the kubeconfig context in use, when loaded from kubeconfig.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Picks the namespace to list in.
    ///
    /// Namespace determination follows this priority:
    /// 1. Uses the namespace if explicitly specified.
    /// 2. Uses the default namespace associated with the connection.
    /// 3. Uses "default".
    pub fn determine_namespace(&self, namespace: Option<String>) -> String {
        namespace
            .or_else(|| self.namespace.clone())
            .unwrap_or_else(|| String::from("default"))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl From<Config> for Connection {
    fn from(config: Config) -> Self {
        let namespace = Some(config.default_namespace.clone());
        Self {
            config,
            context: None,
            namespace,
        }
    }
}

impl ClusterConnection for Connection {
    fn client(&self) -> Result<Client, kube::Error> {
        self.config.client()
    }
}

fn determine_context(context: Option<&str>, kubeconfig: &Kubeconfig) -> anyhow::Result<String> {
    match context {
        Some(context) => Ok(context.to_string()),
        None => kubeconfig
            .current_context
            .clone()
            .ok_or_else(|| anyhow::anyhow!("current_context is not set")),
    }
}

fn context_namespace(kubeconfig: &Kubeconfig, context: &str) -> Option<String> {
    kubeconfig
        .contexts
        .iter()
        .find(|named| named.name == context)
        .and_then(|named| named.context.as_ref())
        .and_then(|ctx| ctx.namespace.clone())
}
