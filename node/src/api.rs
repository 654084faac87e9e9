//! # Explorer REST API
//!
//! Builds the axum router that exposes the node's read-only HTTP view of
//! the ledger. All endpoints share application state through axum's
//! `State` extractor; the ledger itself sits behind an async `RwLock`
//! that handlers only ever read. Every write path goes through scenario
//! files at startup — the HTTP surface cannot mutate state.
//!
//! ## Endpoints
//!
//! | Method | Path                                          | Description                       |
//! |--------|-----------------------------------------------|-----------------------------------|
//! | GET    | `/health`                                     | Liveness probe                    |
//! | GET    | `/status`                                     | Ledger summary                    |
//! | GET    | `/config`                                     | Economic parameters and costs     |
//! | GET    | `/curves`                                     | Registered bonding curves         |
//! | GET    | `/terms/:id`                                  | Term detail and its vaults        |
//! | GET    | `/terms/:id/vaults/:curve`                    | One vault's totals and price      |
//! | GET    | `/terms/:id/vaults/:curve/positions/:account` | A holder's share balance          |
//! | GET    | `/accounts/:account/utilization`              | Utilization, current or `?epoch=` |
//! | GET    | `/epochs/:epoch`                              | Fee bucket and total utilization  |
//! | GET    | `/events`                                     | Event log, `?offset=` / `?limit=` |
//! | GET    | `/wallets/:id`                                | Atom wallet address and accrual   |

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use trellis_ledger::accounts::AccountId;
use trellis_ledger::config::LedgerConfig;
use trellis_ledger::curves::CurveId;
use trellis_ledger::events::LedgerEvent;
use trellis_ledger::multivault::MultiVault;
use trellis_ledger::terms::{Term, TermId};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// When this process started serving.
    pub started_at: DateTime<Utc>,
    /// The ledger being explored. Handlers take read locks only.
    pub ledger: Arc<RwLock<MultiVault>>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/config", get(config_handler))
        .route("/curves", get(curves_handler))
        .route("/terms/:id", get(term_handler))
        .route("/terms/:id/vaults/:curve", get(vault_handler))
        .route(
            "/terms/:id/vaults/:curve/positions/:account",
            get(position_handler),
        )
        .route("/accounts/:account/utilization", get(utilization_handler))
        .route("/epochs/:epoch", get(epoch_handler))
        .route("/events", get(events_handler))
        .route("/wallets/:id", get(wallet_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// The epoch the ledger is currently in.
    pub epoch: u64,
    /// Whether user operations are currently suspended.
    pub paused: bool,
    /// Number of registered terms (counter-triples included).
    pub terms: u64,
    /// Number of vaults that have ever been touched.
    pub vaults: u64,
    /// Length of the event log.
    pub events: u64,
    /// ISO-8601 timestamp of process start.
    pub started_at: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /config`: the live [`LedgerConfig`] plus
/// the derived creation costs.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub config: LedgerConfig,
    /// Total motes required to create an atom.
    pub atom_cost: u128,
    /// Total motes required to create a triple.
    pub triple_cost: u128,
}

/// One entry in the `GET /curves` listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurveInfo {
    /// Registry id.
    pub id: u64,
    /// The curve's self-reported name.
    pub name: String,
    /// Whether this is the default curve new terms bootstrap under.
    pub is_default: bool,
}

/// One vault inside a `GET /terms/:id` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultSummary {
    /// Curve id this vault is priced by.
    pub curve: u64,
    /// Total asset motes held.
    pub total_assets: u128,
    /// Total shares issued.
    pub total_shares: u128,
    /// Current share price, absent if the curve is no longer registered.
    pub share_price: Option<u128>,
}

/// Response payload for `GET /terms/:id`.
///
/// Link fields are populated per term kind: atoms carry `payload` and
/// `wallet`, triples carry components and `counter`, counter-triples
/// carry components and `triple`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TermResponse {
    /// Hex term id.
    pub id: String,
    /// "atom", "triple", or "counter_triple".
    pub kind: String,
    /// Hex-encoded atom payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    /// The negative side, for triples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<String>,
    /// The positive side, for counter-triples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triple: Option<String>,
    /// The fee wallet address, for atoms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    /// Every vault open under this term, ordered by curve id.
    pub vaults: Vec<VaultSummary>,
}

/// Response payload for `GET /terms/:id/vaults/:curve`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultResponse {
    /// Hex term id.
    pub term: String,
    /// Curve id.
    pub curve: u64,
    pub total_assets: u128,
    pub total_shares: u128,
    /// Current share price, absent if the curve is no longer registered.
    pub share_price: Option<u128>,
}

/// Response payload for `GET /terms/:id/vaults/:curve/positions/:account`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PositionResponse {
    pub term: String,
    pub curve: u64,
    pub account: String,
    /// Shares held; zero for accounts that never deposited.
    pub shares: u128,
}

/// Response payload for `GET /accounts/:account/utilization`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UtilizationResponse {
    pub account: String,
    /// The epoch the value is reported as of.
    pub epoch: u64,
    /// Signed net staking flow as of that epoch.
    pub utilization: i128,
    /// The ledger's current epoch.
    pub current_epoch: u64,
    /// Epochs with explicit entries in the account's ring, newest first.
    pub tracked_epochs: Vec<u64>,
}

/// Response payload for `GET /epochs/:epoch`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EpochResponse {
    pub epoch: u64,
    /// Whether this is the ledger's current epoch.
    pub current: bool,
    /// Protocol fees still waiting in this epoch's bucket.
    pub protocol_fees_accrued: u128,
    /// Ledger-wide net staking flow as of this epoch.
    pub total_utilization: i128,
}

/// Response payload for `GET /events`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    /// Total number of events in the log.
    pub total: u64,
    /// Offset this page starts at.
    pub offset: u64,
    /// Number of events in this page.
    pub count: u64,
    pub events: Vec<LedgerEvent>,
}

/// Response payload for `GET /wallets/:id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    /// Hex id of the atom the wallet belongs to.
    pub atom: String,
    /// Bech32 wallet address.
    pub wallet: String,
    /// Fees accrued and not yet claimed, in motes.
    pub accrued: u128,
}

/// Generic error body returned by endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Query Types
// ---------------------------------------------------------------------------

/// Query string for `GET /accounts/:account/utilization`.
#[derive(Debug, Deserialize)]
pub struct UtilizationQuery {
    /// Epoch to report as of; defaults to the current epoch.
    pub epoch: Option<u64>,
}

/// Query string for `GET /events`.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Hard cap on `?limit=` for the event log.
const MAX_EVENT_PAGE: usize = 1_000;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn parse_term_id(raw: &str) -> Result<TermId, Response> {
    TermId::from_hex(raw)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("invalid term id: {e}")))
}

/// `GET /health` — returns 200 if the node is alive.
///
/// This is the liveness probe for orchestrators (k8s, systemd, etc.).
/// It intentionally does not inspect ledger state — that belongs in
/// `/status`.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /status` — one-screen summary of the ledger behind this node.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let vault = state.ledger.read().await;
    Json(StatusResponse {
        version: state.version.clone(),
        epoch: vault.current_epoch(),
        paused: vault.is_paused(),
        terms: vault.terms().term_count(),
        vaults: vault.vaults().len() as u64,
        events: vault.events().len() as u64,
        started_at: state.started_at.to_rfc3339(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// `GET /config` — the economic parameters the ledger runs under, plus
/// the derived atom and triple creation costs.
async fn config_handler(State(state): State<AppState>) -> impl IntoResponse {
    let vault = state.ledger.read().await;
    Json(ConfigResponse {
        config: vault.config().clone(),
        atom_cost: vault.atom_cost(),
        triple_cost: vault.triple_cost(),
    })
}

/// `GET /curves` — every registered bonding curve, default first.
async fn curves_handler(State(state): State<AppState>) -> impl IntoResponse {
    let vault = state.ledger.read().await;
    let default = vault.config().default_curve_id;
    let mut curves: Vec<CurveInfo> = vault
        .curve_ids()
        .into_iter()
        .map(|id| CurveInfo {
            id: id.value(),
            name: vault.curve_name(id).unwrap_or("unknown").to_string(),
            is_default: id == default,
        })
        .collect();
    curves.sort_by_key(|c| (!c.is_default, c.id));
    Json(curves)
}

/// `GET /terms/:id` — a term, its kind-specific links, and every vault
/// open under it.
async fn term_handler(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let term = match parse_term_id(&id) {
        Ok(term) => term,
        Err(resp) => return resp,
    };
    let vault = state.ledger.read().await;
    let Some(entry) = vault.terms().get(&term) else {
        return error_response(StatusCode::NOT_FOUND, format!("term not found: {id}"));
    };

    let (kind, payload) = match entry {
        Term::Atom { payload } => ("atom", Some(hex::encode(payload))),
        Term::Triple { .. } => ("triple", None),
        Term::CounterTriple { .. } => ("counter_triple", None),
    };
    let components = vault.terms().components(&term);
    let mut vaults: Vec<VaultSummary> = vault
        .vaults()
        .iter()
        .filter(|(key, _)| key.term == term)
        .map(|(key, v)| VaultSummary {
            curve: key.curve.value(),
            total_assets: v.total_assets,
            total_shares: v.total_shares,
            share_price: vault.current_share_price(&term, key.curve).ok(),
        })
        .collect();
    vaults.sort_by_key(|v| v.curve);

    Json(TermResponse {
        id: term.to_string(),
        kind: kind.to_string(),
        payload,
        subject: components.map(|(s, _, _)| s.to_string()),
        predicate: components.map(|(_, p, _)| p.to_string()),
        object: components.map(|(_, _, o)| o.to_string()),
        counter: vault.counter_id_of(&term).map(|t| t.to_string()),
        triple: vault.triple_id_of(&term).map(|t| t.to_string()),
        wallet: vault
            .wallet_address_of(&term)
            .map(|w| w.as_str().to_string()),
        vaults,
    })
    .into_response()
}

/// `GET /terms/:id/vaults/:curve` — one vault's totals and share price.
///
/// A vault nobody ever touched reports zero totals rather than 404; the
/// term itself must exist.
async fn vault_handler(
    Path((id, curve)): Path<(String, u64)>,
    State(state): State<AppState>,
) -> Response {
    let term = match parse_term_id(&id) {
        Ok(term) => term,
        Err(resp) => return resp,
    };
    let vault = state.ledger.read().await;
    if !vault.is_term_created(&term) {
        return error_response(StatusCode::NOT_FOUND, format!("term not found: {id}"));
    }
    let curve = CurveId::new(curve);
    let (total_assets, total_shares) = vault.vault_totals(&term, curve);
    Json(VaultResponse {
        term: term.to_string(),
        curve: curve.value(),
        total_assets,
        total_shares,
        share_price: vault.current_share_price(&term, curve).ok(),
    })
    .into_response()
}

/// `GET /terms/:id/vaults/:curve/positions/:account` — a holder's share
/// balance in one vault. Unknown accounts hold zero.
async fn position_handler(
    Path((id, curve, account)): Path<(String, u64, String)>,
    State(state): State<AppState>,
) -> Response {
    let term = match parse_term_id(&id) {
        Ok(term) => term,
        Err(resp) => return resp,
    };
    let vault = state.ledger.read().await;
    if !vault.is_term_created(&term) {
        return error_response(StatusCode::NOT_FOUND, format!("term not found: {id}"));
    }
    let curve = CurveId::new(curve);
    let account = AccountId::from(account.as_str());
    Json(PositionResponse {
        term: term.to_string(),
        curve: curve.value(),
        shares: vault.get_shares(&account, &term, curve),
        account: account.as_str().to_string(),
    })
    .into_response()
}

/// `GET /accounts/:account/utilization` — an account's signed net
/// staking flow, as of the current epoch or an explicit `?epoch=`.
async fn utilization_handler(
    Path(account): Path<String>,
    Query(query): Query<UtilizationQuery>,
    State(state): State<AppState>,
) -> Response {
    let vault = state.ledger.read().await;
    let account = AccountId::from(account.as_str());
    let epoch = query.epoch.unwrap_or_else(|| vault.current_epoch());
    match vault.utilization_as_of(&account, epoch) {
        Ok(utilization) => Json(UtilizationResponse {
            account: account.as_str().to_string(),
            epoch,
            utilization,
            current_epoch: vault.current_epoch(),
            tracked_epochs: vault.utilization().ring_of(&account).to_vec(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// `GET /epochs/:epoch` — one epoch's protocol fee bucket and the
/// ledger-wide utilization as of that epoch.
async fn epoch_handler(
    Path(epoch): Path<u64>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let vault = state.ledger.read().await;
    Json(EpochResponse {
        epoch,
        current: epoch == vault.current_epoch(),
        protocol_fees_accrued: vault.protocol_fees_accrued(epoch),
        total_utilization: vault.total_utilization(epoch),
    })
}

/// `GET /events` — a page of the event log in application order.
///
/// `?offset=` skips, `?limit=` caps the page (default 100, max 1000).
async fn events_handler(
    Query(query): Query<EventsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let vault = state.ledger.read().await;
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(MAX_EVENT_PAGE);
    let log = vault.events();
    let events: Vec<LedgerEvent> = log.iter().skip(offset).take(limit).cloned().collect();
    Json(EventsResponse {
        total: log.len() as u64,
        offset: offset as u64,
        count: events.len() as u64,
        events,
    })
}

/// `GET /wallets/:id` — the fee wallet attached to an atom and its
/// unclaimed accrual. 404 for triples and unknown terms; wallets only
/// attach to atoms.
async fn wallet_handler(Path(id): Path<String>, State(state): State<AppState>) -> Response {
    let term = match parse_term_id(&id) {
        Ok(term) => term,
        Err(resp) => return resp,
    };
    let vault = state.ledger.read().await;
    let Some(wallet) = vault.wallet_address_of(&term) else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("no wallet for term {id} (wallets attach to atoms)"),
        );
    };
    Json(WalletResponse {
        atom: term.to_string(),
        accrued: vault.wallet_fees_accrued(&wallet),
        wallet: wallet.as_str().to_string(),
    })
    .into_response()
}
