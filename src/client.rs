//! Async client for the Tezos node's contract and big-map RPC endpoints.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::transport::Transport;
use crate::types::ParseError;

#[cfg(feature = "client")]
use crate::transport::HttpTransport;

/// One entry of the error list a Tezos node returns with a failed request.
///
/// ```json
/// [{ "kind": "permanent", "id": "proto.alpha.contract.non_existing_contract", "contract": "KT1..." }]
/// ```
///
/// Fields beyond `kind` and `id` depend on the error and are kept in `rest`.
#[derive(Clone, Debug, PartialEq, Deserialize, thiserror::Error)]
#[error("{kind} error {id}")]
pub struct RpcError {
    /// Error class: `temporary`, `permanent` or `branch`.
    pub kind: String,
    /// Error identifier, e.g. `proto.alpha.contract.non_existing_contract`.
    pub id: String,
    /// Error specific detail.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl RpcError {
    /// Returns `true` if retrying later may succeed.
    pub fn is_temporary(&self) -> bool {
        self.kind == "temporary"
    }

    /// Returns `true` if the request can never succeed.
    pub fn is_permanent(&self) -> bool {
        self.kind == "permanent"
    }

    /// Returns `true` if the error only holds on the queried branch.
    pub fn is_branch(&self) -> bool {
        self.kind == "branch"
    }
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("RPC error (HTTP status {status}): {}", first_error(.errors))]
    Rpc { status: u16, errors: Vec<RpcError> },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integer parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn first_error(errors: &[RpcError]) -> String {
    match errors.first() {
        Some(err) => err.to_string(),
        None => "no detail".to_string(),
    }
}

impl Error {
    /// Node errors attached to a failed request, if any.
    pub fn rpc_errors(&self) -> &[RpcError] {
        match self {
            Self::Rpc { errors, .. } => errors,
            _ => &[],
        }
    }

    /// The HTTP status of a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Rpc { status, .. } => Some(*status),
            #[cfg(feature = "client")]
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Read-only queries over contracts and big maps.
///
/// Every method issues exactly one GET through the transport and decodes the
/// response. Dropping the returned future cancels the request.
///
/// # Example
///
/// ```no_run
/// use tezos_contracts_rpc::{Address, ContractQueryClient};
///
/// #[tokio::main]
/// async fn main() -> tezos_contracts_rpc::client::Result<()> {
///     let client = ContractQueryClient::mainnet();
///     let addr: Address = "KT1PWx2mnDueood7fEmfbBDKx1D9BAnnXitn".parse()?;
///     let balance = client.get_contract_balance(&addr, tezos_contracts_rpc::BlockId::Head).await?;
///     println!("balance: {balance} mutez");
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct ContractQueryClient<T> {
    transport: T,
}

impl<T: Transport> ContractQueryClient<T> {
    /// Create a client over any transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let body = self.transport.get(path).await?;
        serde_json::from_str(&body).map_err(|err| {
            tracing::trace!(path, error = %err, "failed to decode response");
            Error::Json(err)
        })
    }
}

#[cfg(feature = "client")]
impl ContractQueryClient<HttpTransport> {
    /// Create a client for Tezos Mainnet.
    pub fn mainnet() -> Self {
        Self::new(HttpTransport::mainnet())
    }

    /// Create a client for the Ghostnet test network.
    pub fn ghostnet() -> Self {
        Self::new(HttpTransport::ghostnet())
    }

    /// Create a client for a local node (localhost:8732).
    pub fn local() -> Self {
        Self::new(HttpTransport::local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[cfg(feature = "client")]
    #[test]
    fn test_client_creation() {
        let client = ContractQueryClient::mainnet();
        assert_eq!(client.transport().base_url(), "https://rpc.tzbeta.net");

        let client = ContractQueryClient::ghostnet();
        assert_eq!(
            client.transport().base_url(),
            "https://rpc.ghostnet.teztnets.com"
        );

        let client = ContractQueryClient::local();
        assert_eq!(client.transport().base_url(), "http://localhost:8732");
    }

    #[test]
    fn rpc_error_kinds() {
        let errors: Vec<RpcError> = serde_json::from_value(json!([
            { "kind": "temporary", "id": "failure", "msg": "busy" },
            { "kind": "permanent", "id": "proto.alpha.contract.non_existing_contract", "contract": "KT1" },
            { "kind": "branch", "id": "proto.alpha.contract.counter_in_the_past" }
        ]))
        .expect("decode");

        assert!(errors[0].is_temporary());
        assert_eq!(errors[0].rest["msg"], json!("busy"));
        assert!(errors[1].is_permanent());
        assert_eq!(errors[1].rest["contract"], json!("KT1"));
        assert!(errors[2].is_branch());
        assert!(!errors[2].is_permanent());
    }

    #[test]
    fn error_display_and_accessors() {
        let err = Error::Rpc {
            status: 404,
            errors: vec![RpcError {
                kind: "permanent".to_string(),
                id: "proto.alpha.contract.non_existing_contract".to_string(),
                rest: Default::default(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "RPC error (HTTP status 404): permanent error proto.alpha.contract.non_existing_contract"
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.rpc_errors().len(), 1);

        let err = Error::Status {
            status: 500,
            body: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP status 500: oops");
        assert!(err.rpc_errors().is_empty());

        let err: Error = "x".parse::<i64>().unwrap_err().into();
        assert_eq!(err.status(), None);
    }
}
