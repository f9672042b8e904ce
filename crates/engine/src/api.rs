//! JSON request/response surface.
//!
//! Each request variant mirrors one endpoint of the dashboard backend:
//!
//! | request           | endpoint                  |
//! |-------------------|---------------------------|
//! | `optimizeRoute`   | `POST /route/optimize`    |
//! | `currentRoute`    | `GET /route/current`      |
//! | `selectAlgorithm` | `POST /route/algorithm`   |
//! | `rebalance`       | `POST /cluster/rebalance` |
//! | `tick`            | `POST /cluster/tick`      |
//! | `nodes`           | `GET /cluster/nodes`      |
//! | `ring`            | `GET /cluster/ring`       |
//! | `ownership`       | `GET /cluster/ownership`  |
//! | `locate`          | `GET /ring/locate`        |
//!
//! The layer only reads copies and results; it never reaches into the
//! cluster's state directly.

use corelib::{Error, Node, NodeId, Ownership, RingSnapshot, Token};
use monitor::RebalanceAck;
use routing::{Algorithm, RoutePlan, RouteRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::{Cluster, TickOutcome};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ApiRequest {
    OptimizeRoute(RouteRequest),
    CurrentRoute,
    SelectAlgorithm { algorithm: String },
    Rebalance,
    Tick,
    Nodes,
    Ring,
    Ownership,
    Locate { key: String },
}

impl ApiRequest {
    /// HTTP method and path this request stands for.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ApiRequest::OptimizeRoute(_) => "POST /route/optimize",
            ApiRequest::CurrentRoute => "GET /route/current",
            ApiRequest::SelectAlgorithm { .. } => "POST /route/algorithm",
            ApiRequest::Rebalance => "POST /cluster/rebalance",
            ApiRequest::Tick => "POST /cluster/tick",
            ApiRequest::Nodes => "GET /cluster/nodes",
            ApiRequest::Ring => "GET /cluster/ring",
            ApiRequest::Ownership => "GET /cluster/ownership",
            ApiRequest::Locate { .. } => "GET /ring/locate",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ApiResponse {
    Plan(RoutePlan),
    CurrentRoute { plan: Option<RoutePlan> },
    AlgorithmSelected { algorithm: Algorithm },
    Rebalanced(RebalanceAck),
    Ticked(TickOutcome),
    Nodes { nodes: Vec<Node> },
    Ring(RingSnapshot),
    Ownership { ranges: Vec<Ownership> },
    Located { key: String, node: NodeId, position: Option<Token> },
    Error { kind: String, message: String, retryable: bool },
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ApiResponse::Error { .. })
    }
}

impl From<Error> for ApiResponse {
    fn from(err: Error) -> Self {
        ApiResponse::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Serve one request. Failures come back as `ApiResponse::Error`.
pub fn handle(cluster: &mut Cluster, request: ApiRequest) -> ApiResponse {
    debug!(endpoint = request.endpoint(), "api request");
    let result = match request {
        ApiRequest::OptimizeRoute(route) => cluster.optimize(&route).map(ApiResponse::Plan),
        ApiRequest::CurrentRoute => Ok(ApiResponse::CurrentRoute {
            plan: cluster.current_plan().cloned(),
        }),
        ApiRequest::SelectAlgorithm { algorithm } => cluster
            .select_algorithm(&algorithm)
            .map(|algorithm| ApiResponse::AlgorithmSelected { algorithm }),
        ApiRequest::Rebalance => cluster.simulate_rebalance().map(ApiResponse::Rebalanced),
        ApiRequest::Tick => cluster.tick().map(ApiResponse::Ticked),
        ApiRequest::Nodes => Ok(ApiResponse::Nodes {
            nodes: cluster.nodes(),
        }),
        ApiRequest::Ring => Ok(ApiResponse::Ring(cluster.ring().as_ref().clone())),
        ApiRequest::Ownership => Ok(ApiResponse::Ownership {
            ranges: cluster.ownership(),
        }),
        ApiRequest::Locate { key } => cluster.locate(&key).map(|node| {
            let position = cluster.ring().position_of(&node);
            ApiResponse::Located { key, node, position }
        }),
    };
    result.unwrap_or_else(ApiResponse::from)
}

/// Serve one JSON-encoded request and encode the response.
pub fn handle_json(cluster: &mut Cluster, body: &str) -> String {
    let response = match serde_json::from_str::<ApiRequest>(body) {
        Ok(request) => handle(cluster, request),
        Err(err) => ApiResponse::Error {
            kind: "BadRequest".to_string(),
            message: err.to_string(),
            retryable: false,
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|err| {
        format!(r#"{{"type":"error","kind":"Internal","message":{:?},"retryable":false}}"#, err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_request_wire_format() {
        let request: ApiRequest = serde_json::from_str(
            r#"{"op":"optimizeRoute","source":"Seattle DC","destination":"Chicago","algorithm":"dijkstra"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            ApiRequest::OptimizeRoute(RouteRequest::new("Seattle DC", "Chicago", "dijkstra"))
        );
        assert_eq!(request.endpoint(), "POST /route/optimize");

        let request: ApiRequest = serde_json::from_str(r#"{"op":"locate","key":"order-1"}"#).unwrap();
        assert_eq!(request.endpoint(), "GET /ring/locate");
    }

    #[test]
    fn test_errors_carry_kind_and_retryability() {
        let mut cluster = Cluster::seeded(&EngineConfig::default()).unwrap();
        let response = handle(
            &mut cluster,
            ApiRequest::OptimizeRoute(RouteRequest::new("Seattle DC", "Chicago", "quantum")),
        );
        match response {
            ApiResponse::Error { kind, retryable, .. } => {
                assert_eq!(kind, "InvalidAlgorithm");
                assert!(!retryable);
            }
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_json() {
        let mut cluster = Cluster::seeded(&EngineConfig::default()).unwrap();
        let body = handle_json(&mut cluster, r#"{"op":"teleport"}"#);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["kind"], "BadRequest");
    }
}
