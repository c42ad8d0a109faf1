//! The GET capability the query client is layered on.

use std::future::Future;

use crate::client::Result;

#[cfg(feature = "client")]
pub use http::{HttpTransport, HttpTransportBuilder};

/// Performs a GET for a path relative to the node's API root.
///
/// Implementations return the body of a successful response and turn any
/// non-success status into an error. Implementations shared between tasks
/// must be safe for concurrent use.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str) -> impl Future<Output = Result<String>> + Send;
}

#[cfg(feature = "client")]
mod http {
    use std::time::Duration;

    use reqwest::Client;

    use crate::client::{Error, Result, RpcError};

    use super::Transport;

    const MAINNET_URL: &str = "https://rpc.tzbeta.net";
    const GHOSTNET_URL: &str = "https://rpc.ghostnet.teztnets.com";
    const LOCAL_URL: &str = "http://localhost:8732";

    /// [`Transport`] over HTTP(S) backed by `reqwest`.
    #[derive(Clone, Debug)]
    pub struct HttpTransport {
        client: Client,
        base_url: String,
    }

    impl HttpTransport {
        /// Create a transport with a default `reqwest` client.
        pub fn new(url: impl Into<String>) -> Self {
            Self::with_client(Client::new(), url)
        }

        /// Create a transport around an already configured `reqwest` client.
        pub fn with_client(client: Client, url: impl Into<String>) -> Self {
            let url = url.into();
            Self {
                client,
                base_url: url.trim_end_matches('/').to_string(),
            }
        }

        /// Start configuring a transport for `url`.
        pub fn builder(url: impl Into<String>) -> HttpTransportBuilder {
            HttpTransportBuilder {
                base_url: url.into(),
                timeout: None,
                user_agent: None,
            }
        }

        /// Public Tezos Mainnet endpoint.
        pub fn mainnet() -> Self {
            Self::new(MAINNET_URL)
        }

        /// Public Ghostnet endpoint.
        pub fn ghostnet() -> Self {
            Self::new(GHOSTNET_URL)
        }

        /// A node on localhost with the default RPC port.
        pub fn local() -> Self {
            Self::new(LOCAL_URL)
        }

        /// Base URL without trailing slash.
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, path: &str) -> String {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    impl Transport for HttpTransport {
        async fn get(&self, path: &str) -> Result<String> {
            let url = self.url(path);
            tracing::debug!(%url, "GET");

            let response = self.client.get(&url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            if status.is_success() {
                return Ok(body);
            }

            tracing::warn!(%url, status = status.as_u16(), "request failed");
            let status = status.as_u16();
            match serde_json::from_str::<Vec<RpcError>>(&body) {
                Ok(errors) if !errors.is_empty() => Err(Error::Rpc { status, errors }),
                _ => Err(Error::Status { status, body }),
            }
        }
    }

    /// Builder for [`HttpTransport`].
    #[derive(Clone, Debug)]
    pub struct HttpTransportBuilder {
        base_url: String,
        timeout: Option<Duration>,
        user_agent: Option<String>,
    }

    impl HttpTransportBuilder {
        /// Abort requests that take longer than `timeout`.
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        /// Send `user_agent` with every request.
        pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
            self.user_agent = Some(user_agent.into());
            self
        }

        /// Build the transport, failing if the `reqwest` client cannot be created.
        pub fn build(self) -> Result<HttpTransport> {
            let mut builder = Client::builder();
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(user_agent) = self.user_agent {
                builder = builder.user_agent(user_agent);
            }
            Ok(HttpTransport::with_client(builder.build()?, self.base_url))
        }
    }

}
