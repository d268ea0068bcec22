//! Node and VM addressing.

use url::Url;

/// Fixed path segment between the API host and the VM name.
pub const CHAIN_PATH: &str = "ext/bc";

/// Namespace serving the generic `hypersdk.*` methods.
pub const CORE_NAMESPACE: &str = "coreapi";

/// Where a client sends its requests. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointIdentity {
    api_host: Url,
    vm_name: String,
    vm_rpc_prefix: String,
}

impl EndpointIdentity {
    /// Build an identity. A leading `/` on `vm_rpc_prefix` is dropped.
    pub fn new(api_host: Url, vm_name: impl Into<String>, vm_rpc_prefix: impl Into<String>) -> Self {
        let prefix = vm_rpc_prefix.into();
        let vm_rpc_prefix = match prefix.strip_prefix('/') {
            Some(stripped) => stripped.to_owned(),
            None => prefix,
        };
        Self {
            api_host,
            vm_name: vm_name.into(),
            vm_rpc_prefix,
        }
    }

    /// Parse `api_host` and build an identity.
    pub fn parse(
        api_host: &str,
        vm_name: impl Into<String>,
        vm_rpc_prefix: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(api_host)?, vm_name, vm_rpc_prefix))
    }

    pub fn api_host(&self) -> &Url {
        &self.api_host
    }

    pub fn vm_name(&self) -> &str {
        &self.vm_name
    }

    pub fn vm_rpc_prefix(&self) -> &str {
        &self.vm_rpc_prefix
    }

    /// `{api_host}/ext/bc/{vm_name}/{namespace}`
    pub fn url_for(&self, namespace: &str) -> String {
        format!(
            "{}/{CHAIN_PATH}/{}/{namespace}",
            self.api_host.as_str().trim_end_matches('/'),
            self.vm_name,
        )
    }
}
