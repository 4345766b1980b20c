//! REST handlers mirroring the Cosmos SDK node endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::server::GatewayState;
use crate::types::{
    AccountResponse, AllBalancesResponse, BalanceResponse, BroadcastTxResponse,
    DelegationsResponse, GasInfo, NodeInfoResponse, Pagination, RewardsResponse,
    SimulateRestResponse, SimulateResult, UnbondingDelegationsResponse,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RestError = (StatusCode, Json<ErrorResponse>);
pub type RestResult<T> = Result<Json<T>, RestError>;

pub fn to_http_error(error: GatewayError) -> RestError {
    let status = match &error {
        GatewayError::BadRequest(_)
        | GatewayError::Decode(_)
        | GatewayError::UnsupportedQueryPath(_)
        | GatewayError::TxRejected { .. } => StatusCode::BAD_REQUEST,
        GatewayError::ChainUnavailable(_) => StatusCode::BAD_GATEWAY,
        GatewayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub async fn balances(
    State(state): State<Arc<GatewayState>>,
    Path(address): Path<String>,
) -> RestResult<AllBalancesResponse> {
    let balances = state
        .balance
        .balances(&address, None)
        .await
        .map_err(to_http_error)?;
    Ok(Json(AllBalancesResponse {
        balances,
        pagination: Pagination::empty(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DenomQuery {
    pub denom: String,
}

pub async fn balance_by_denom(
    State(state): State<Arc<GatewayState>>,
    Path(address): Path<String>,
    Query(query): Query<DenomQuery>,
) -> RestResult<BalanceResponse> {
    let balance = state
        .balance
        .balance(&address, &query.denom, None)
        .await
        .map_err(to_http_error)?;
    Ok(Json(BalanceResponse { balance }))
}

pub async fn account(
    State(state): State<Arc<GatewayState>>,
    Path(address): Path<String>,
) -> RestResult<AccountResponse> {
    let response = state
        .account
        .accounts(&address, None)
        .await
        .map_err(to_http_error)?;
    Ok(Json(response))
}

pub async fn node_info(State(state): State<Arc<GatewayState>>) -> RestResult<NodeInfoResponse> {
    let response = state.node_info.node_info().await.map_err(to_http_error)?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct BroadcastTxBody {
    pub tx_bytes: String,
    #[serde(default)]
    pub mode: Option<u32>,
}

pub async fn broadcast_tx(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<BroadcastTxBody>,
) -> RestResult<BroadcastTxResponse> {
    let tx_bytes = BASE64.decode(&body.tx_bytes).map_err(|e| {
        to_http_error(GatewayError::BadRequest(format!("invalid tx_bytes: {e}")))
    })?;
    let tx_response = state
        .tx
        .broadcast_tx(&tx_bytes)
        .await
        .map_err(to_http_error)?;
    Ok(Json(BroadcastTxResponse { tx_response }))
}

#[derive(Debug, Deserialize)]
pub struct SimulateBody {
    pub tx_bytes: String,
}

pub async fn simulate(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<SimulateBody>,
) -> RestResult<SimulateRestResponse> {
    let tx_bytes = BASE64.decode(&body.tx_bytes).map_err(|e| {
        to_http_error(GatewayError::BadRequest(format!("invalid tx_bytes: {e}")))
    })?;
    let outcome = state
        .tx
        .simulate(&tx_bytes, None)
        .await
        .map_err(to_http_error)?;
    Ok(Json(SimulateRestResponse {
        gas_info: GasInfo {
            gas_wanted: outcome.gas_wanted.to_string(),
            gas_used: outcome.gas_used.to_string(),
        },
        result: SimulateResult {
            data: String::new(),
            log: String::new(),
            events: outcome.events,
            msg_responses: Vec::new(),
        },
    }))
}

pub async fn delegations(
    State(state): State<Arc<GatewayState>>,
    Path(delegator_addr): Path<String>,
) -> Json<DelegationsResponse> {
    Json(state.staking.delegations(&delegator_addr))
}

pub async fn unbonding_delegations(
    State(state): State<Arc<GatewayState>>,
    Path(delegator_addr): Path<String>,
) -> Json<UnbondingDelegationsResponse> {
    Json(state.staking.unbonding_delegations(&delegator_addr))
}

pub async fn rewards(
    State(state): State<Arc<GatewayState>>,
    Path(delegator_address): Path<String>,
) -> Json<RewardsResponse> {
    Json(state.distribution.rewards(&delegator_address))
}
