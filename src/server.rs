use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{FromRef, State, WebSocketUpgrade};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use jsonrpsee::RpcModule;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::config::Config;
use crate::ingest::BlockIngestor;
use crate::methods::{jsonrpc, rest};
use crate::services::{
    AbciService, AccountService, BalanceService, DistributionService, NodeInfoService,
    StakingService, StatusService, TxService,
};
use crate::store::TxStore;

/// Interval between reconnect attempts to the chain node.
const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Shared state for the gateway. Every service is built once at startup
/// and wired explicitly; there is no runtime service registry.
pub struct GatewayState {
    pub config: Config,
    pub chain: Arc<ChainClient>,
    pub store: Arc<TxStore>,
    pub account: Arc<AccountService>,
    pub balance: Arc<BalanceService>,
    pub abci: Arc<AbciService>,
    pub tx: Arc<TxService>,
    pub status: Arc<StatusService>,
    pub node_info: Arc<NodeInfoService>,
    pub staking: StakingService,
    pub distribution: DistributionService,
}

/// Router state: gateway services plus the JSON-RPC dispatch module.
#[derive(Clone)]
pub struct ServerContext {
    pub state: Arc<GatewayState>,
    pub rpc: RpcModule<Arc<GatewayState>>,
}

impl FromRef<ServerContext> for Arc<GatewayState> {
    fn from_ref(context: &ServerContext) -> Self {
        context.state.clone()
    }
}

/// Build all services, start the block ingestor and serve REST + JSON-RPC.
pub async fn start_server(config: Config) -> Result<()> {
    let chain = Arc::new(ChainClient::new(&config.chain_endpoint, RECONNECT_INTERVAL));

    if let Err(e) = chain.try_connect().await {
        warn!("Could not reach chain RPC (will keep retrying): {e}");
    } else {
        match chain.chain_info().await {
            Ok(info) => info!(
                "Chain: id={}, name={}, bech32 prefix={}",
                info.chain_id, info.name, info.bech32_prefix
            ),
            Err(e) => warn!("Could not fetch chain info: {e}"),
        }
    }

    let store = Arc::new(TxStore::open(&config.db_path)?);

    let account = Arc::new(AccountService::new(chain.clone()));
    let balance = Arc::new(BalanceService::new(
        chain.clone(),
        account.clone(),
        config.chain_denom.clone(),
    ));
    let tx = Arc::new(TxService::new(chain.clone(), store.clone()));
    let abci = Arc::new(AbciService::new(
        chain.clone(),
        account.clone(),
        balance.clone(),
        tx.clone(),
    ));
    let status = Arc::new(StatusService::new(chain.clone(), config.clone()));
    let node_info = Arc::new(NodeInfoService::new(chain.clone(), config.clone()));

    let state = Arc::new(GatewayState {
        config: config.clone(),
        chain: chain.clone(),
        store: store.clone(),
        account,
        balance,
        abci,
        tx,
        status,
        node_info,
        staking: StakingService,
        distribution: DistributionService,
    });

    let mut module = RpcModule::new(state.clone());
    jsonrpc::register_methods(&mut module)?;

    let ingestor = BlockIngestor::new(chain, store, config.cosmos_pallet_index);
    tokio::spawn(ingestor.run());

    let context = ServerContext {
        state,
        rpc: module,
    };

    let router = Router::new()
        .route(
            "/cosmos/bank/v1beta1/balances/:address",
            get(rest::balances),
        )
        .route(
            "/cosmos/bank/v1beta1/balances/:address/by_denom",
            get(rest::balance_by_denom),
        )
        .route(
            "/cosmos/auth/v1beta1/accounts/:address",
            get(rest::account),
        )
        .route(
            "/cosmos/base/tendermint/v1beta1/node_info",
            get(rest::node_info),
        )
        .route("/cosmos/tx/v1beta1/txs", post(rest::broadcast_tx))
        .route("/cosmos/tx/v1beta1/simulate", post(rest::simulate))
        .route(
            "/cosmos/staking/v1beta1/delegations/:delegator_addr",
            get(rest::delegations),
        )
        .route(
            "/cosmos/staking/v1beta1/delegators/:delegator_addr/unbonding_delegations",
            get(rest::unbonding_delegations),
        )
        .route(
            "/cosmos/distribution/v1beta1/delegators/:delegator_address/rewards",
            get(rest::rewards),
        )
        .route("/websocket", get(websocket_upgrade))
        .route("/", post(jsonrpc_http))
        .layer(CorsLayer::permissive())
        .with_state(context);

    let listener = TcpListener::bind(("0.0.0.0", config.server_port))
        .await
        .map_err(|e| anyhow!("Failed to bind port {}: {e}", config.server_port))?;

    info!(
        "Gateway listening on http://0.0.0.0:{} (REST + JSON-RPC, /websocket for WS)",
        config.server_port
    );

    axum::serve(listener, router).await?;

    info!("Gateway stopped");
    Ok(())
}

/// JSON-RPC over the persistent WebSocket channel.
async fn websocket_upgrade(
    ws: WebSocketUpgrade,
    State(context): State<ServerContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, context))
}

async fn handle_socket(mut socket: WebSocket, context: ServerContext) {
    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(request) = message else {
            continue;
        };
        match context.rpc.raw_json_request(&request, 1).await {
            Ok((response, _)) => {
                if socket.send(Message::Text(response)).await.is_err() {
                    break;
                }
            }
            Err(e) => debug!("Dropping malformed JSON-RPC frame: {e}"),
        }
    }
}

/// JSON-RPC over plain HTTP POST.
async fn jsonrpc_http(State(context): State<ServerContext>, body: String) -> impl IntoResponse {
    match context.rpc.raw_json_request(&body, 1).await {
        Ok((response, _)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            response,
        )
            .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}
