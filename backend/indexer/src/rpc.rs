//! Soroban RPC client — polls `getEvents` and decodes crowdfunding events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CampaignEvent, EventKind};
use crate::scval::{self, TopicValue};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Invalid request (-32600) and unknown method (-32601) fail the same way
    /// on every retry.
    pub fn is_hard(&self) -> bool {
        matches!(self.code, -32600 | -32601)
    }
}

impl From<RpcError> for IndexerError {
    fn from(err: RpcError) -> Self {
        IndexerError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// XDR-encoded topic list
    pub topic: Vec<String>,
    /// Event data: a base64 XDR `ScVal`, or already-decoded JSON
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let body: RpcResponse = resp.json().await?;

                if let Some(err) = body.error {
                    if err.is_hard() {
                        return Err(err.into());
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or(IndexerError::EmptyResponse)?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`CampaignEvent`] structs.
///
/// Events from failed contract calls are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<CampaignEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<CampaignEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let campaign_id = raw.topic.get(1).map(|t| extract_u64_or_raw(t));

    let (actor, amount) = decode_data(&raw.value, &kind);

    Some(CampaignEvent {
        event_type: kind.as_str().to_string(),
        campaign_id,
        actor,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.as_deref().map(normalize_tx_hash),
    })
}

/// Pull the actor and amount out of the event `value`.
///
/// The RPC sends the value as a base64 XDR `ScVal` by default; it is turned
/// into JSON first so both encodings go through the same field lookup.
fn decode_data(value: &Value, kind: &EventKind) -> (Option<String>, Option<String>) {
    let decoded;
    let value = match value {
        Value::String(b64) => match scval::decode(b64) {
            Some(val) => {
                decoded = scval::to_json(&val);
                &decoded
            }
            None => {
                debug!("Undecodable event value: {b64}");
                return (None, None);
            }
        },
        other => other,
    };

    match kind {
        EventKind::CampaignCreated => {
            let actor = extract_field(value, &["creator", "address"])
                .or_else(|| find_nested(value, "creator"));
            let amount = extract_field(value, &["goal"]);
            (actor, amount)
        }
        EventKind::Funded | EventKind::Refunded => {
            let actor = extract_field(value, &["contributor", "address"])
                .or_else(|| find_nested(value, "contributor"));
            let amount = extract_field(value, &["amount"]);
            (actor, amount)
        }
        EventKind::CampaignCompleted => {
            let amount = extract_field(value, &["raised", "amount"]);
            (None, amount)
        }
        EventKind::Unknown => (None, None),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

fn find_nested(value: &Value, key: &str) -> Option<String> {
    if let Value::Object(map) = value {
        for (k, v) in map {
            if k == key {
                return v.as_str().map(String::from);
            }
            if let Some(found) = find_nested(v, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Extract a Soroban Symbol from a topic entry.
/// The RPC may return `{"type":"symbol","value":"created"}`, base64 XDR, or
/// just the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    if let Some(TopicValue::Symbol(s)) = scval::decode_topic(raw) {
        return s;
    }
    // Fallback: treat the raw string as the symbol
    raw.to_string()
}

/// Extract the campaign id from a topic entry that might be a JSON object,
/// base64 XDR, or a raw number/string.
fn extract_u64_or_raw(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(n) = v.get("value").and_then(|x| x.as_u64()) {
            return n.to_string();
        }
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    if let Some(TopicValue::U64(n)) = scval::decode_topic(raw) {
        return n.to_string();
    }
    raw.to_string()
}

/// Lower-case a 32-byte hex transaction hash; anything else is kept verbatim.
fn normalize_tx_hash(raw: &str) -> String {
    match hex::decode(raw) {
        Ok(bytes) if bytes.len() == 32 => hex::encode(bytes),
        _ => raw.to_string(),
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: &str = "GAAQEAYEAUDAOCAJBIFQYDIOB4IBCEQTCQKRMFYYDENBWHA5DYPSABOV";
    const ALICE: &str = "GAQSEIZEEUTCOKBJFIVSYLJOF4YDCMRTGQ2TMNZYHE5DWPB5HY7UAIOK";
    const CONTRACT: &str = "CDG43TONZXG43TONZXG43TONZXG43TONZXG43TONZXG43TONZXG42EVB";

    const TOPIC_CREATED: &str = "AAAADwAAAAdjcmVhdGVkAA==";
    const TOPIC_FUNDED: &str = "AAAADwAAAAZmdW5kZWQAAA==";
    const TOPIC_COMPLETED: &str = "AAAADwAAAAljb21wbGV0ZWQAAAA=";
    const TOPIC_REFUNDED: &str = "AAAADwAAAAhyZWZ1bmRlZA==";
    const TOPIC_CAMPAIGN_0: &str = "AAAABQAAAAAAAAAA";

    // Funded / Refunded { amount: 50, campaign_id: 0, contributor: ALICE }
    const VALUE_FUNDED: &str = "AAAAEQAAAAEAAAADAAAADwAAAAZhbW91bnQAAAAAAAoAAAAAAAAAAAAAAAAAAAAyAAAADwAAAAtjYW1wYWlnbl9pZAAAAAAFAAAAAAAAAAAAAAAPAAAAC2NvbnRyaWJ1dG9yAAAAABIAAAAAAAAAACEiIyQlJicoKSorLC0uLzAxMjM0NTY3ODk6Ozw9Pj9A";

    /// A `getEvents` response in the node's default (base64 XDR) encoding:
    /// a campaign created with goal 100, funded, refunded, then completed.
    fn get_events_fixture() -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "events": [
                    {
                        "type": "contract",
                        "ledger": 1200,
                        "ledgerClosedAt": "2024-01-01T00:00:00Z",
                        "contractId": CONTRACT,
                        "id": "0005153960755200000-0000000001",
                        "pagingToken": "0005153960755200000-0000000001",
                        "inSuccessfulContractCall": true,
                        "txHash": "AB".repeat(32),
                        "topic": [TOPIC_CREATED, TOPIC_CAMPAIGN_0],
                        "value": "AAAAEQAAAAEAAAAFAAAADwAAAAtjYW1wYWlnbl9pZAAAAAAFAAAAAAAAAAAAAAAPAAAAB2NyZWF0b3IAAAAAEgAAAAAAAAAAAQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyAAAAAPAAAABGdvYWwAAAAKAAAAAAAAAAAAAAAAAAAAZAAAAA8AAAAFdGl0bGUAAAAAAAAOAAAADVRlc3QgQ2FtcGFpZ24AAAAAAAAPAAAABXRva2VuAAAAAAAAEgAAAAGrq6urq6urq6urq6urq6urq6urq6urq6urq6urq6urqw=="
                    },
                    {
                        "type": "contract",
                        "ledger": 1201,
                        "ledgerClosedAt": "2024-01-01T00:00:05Z",
                        "contractId": CONTRACT,
                        "id": "0005154390251929600-0000000001",
                        "pagingToken": "0005154390251929600-0000000001",
                        "inSuccessfulContractCall": true,
                        "txHash": "CD".repeat(32),
                        "topic": [TOPIC_FUNDED, TOPIC_CAMPAIGN_0],
                        "value": VALUE_FUNDED
                    },
                    {
                        "type": "contract",
                        "ledger": 1202,
                        "ledgerClosedAt": "2024-01-01T00:00:10Z",
                        "contractId": CONTRACT,
                        "id": "0005154819748659200-0000000001",
                        "pagingToken": "0005154819748659200-0000000001",
                        "inSuccessfulContractCall": true,
                        "txHash": "EF".repeat(32),
                        "topic": [TOPIC_REFUNDED, TOPIC_CAMPAIGN_0],
                        "value": VALUE_FUNDED
                    },
                    {
                        "type": "contract",
                        "ledger": 1203,
                        "ledgerClosedAt": "2024-01-01T00:00:15Z",
                        "contractId": CONTRACT,
                        "id": "0005155249245388800-0000000001",
                        "pagingToken": "0005155249245388800-0000000001",
                        "inSuccessfulContractCall": true,
                        "txHash": "01".repeat(32),
                        "topic": [TOPIC_COMPLETED, TOPIC_CAMPAIGN_0],
                        "value": "AAAAEQAAAAEAAAACAAAADwAAAAtjYW1wYWlnbl9pZAAAAAAFAAAAAAAAAAAAAAAPAAAABnJhaXNlZAAAAAAACgAAAAAAAAAAAAAAAAAAAGQ="
                    }
                ],
                "latestLedger": 1210,
                "cursor": "0005155249245388800-0000000001"
            }
        })
    }

    fn parse(body: Value) -> RpcResponse {
        serde_json::from_value(body).unwrap()
    }

    fn raw_event(topic: Vec<String>, value: Value) -> RawEvent {
        RawEvent {
            topic,
            value,
            contract_id: Some("CONTRACT1".to_string()),
            tx_hash: Some("TX1".to_string()),
            id: None,
            ledger: Some(1000),
            ledger_closed_at: Some("2024-01-01T00:00:00Z".to_string()),
            in_successful_contract_call: Some(true),
            paging_token: None,
        }
    }

    #[test]
    fn event_kind_from_topic() {
        assert_eq!(EventKind::from_topic("created"), EventKind::CampaignCreated);
        assert_eq!(EventKind::from_topic("funded"), EventKind::Funded);
        assert_eq!(
            EventKind::from_topic("completed"),
            EventKind::CampaignCompleted
        );
        assert_eq!(EventKind::from_topic("refunded"), EventKind::Refunded);
        assert_eq!(EventKind::from_topic("something_else"), EventKind::Unknown);
    }

    #[test]
    fn event_kind_as_str() {
        assert_eq!(EventKind::CampaignCreated.as_str(), "campaign_created");
        assert_eq!(EventKind::Funded.as_str(), "funded");
        assert_eq!(EventKind::CampaignCompleted.as_str(), "campaign_completed");
        assert_eq!(EventKind::Refunded.as_str(), "refunded");
    }

    #[test]
    fn extract_symbol_from_json() {
        let raw = r#"{"type":"symbol","value":"funded"}"#;
        assert_eq!(extract_symbol(raw), "funded");
    }

    #[test]
    fn extract_symbol_from_xdr() {
        assert_eq!(extract_symbol(TOPIC_COMPLETED), "completed");
    }

    #[test]
    fn extract_symbol_raw_fallback() {
        assert_eq!(extract_symbol("refunded"), "refunded");
    }

    #[test]
    fn get_events_response_is_fully_decoded() {
        let body = parse(get_events_fixture());
        let result = body.result.unwrap();
        assert_eq!(result.latest_ledger, Some(1210));
        assert_eq!(
            result.cursor.as_deref(),
            Some("0005155249245388800-0000000001")
        );

        let events = decode_events(&result.events, "IGNORED");
        let kinds: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            kinds,
            ["campaign_created", "funded", "refunded", "campaign_completed"]
        );
        assert!(events.iter().all(|e| e.campaign_id.as_deref() == Some("0")));
        assert!(events.iter().all(|e| e.contract_id == CONTRACT));

        let created = &events[0];
        assert_eq!(created.actor.as_deref(), Some(CREATOR));
        assert_eq!(created.amount.as_deref(), Some("100"));
        assert_eq!(created.ledger, 1200);
        assert_eq!(created.timestamp, 1_704_067_200);
        assert_eq!(created.tx_hash, Some("ab".repeat(32)));

        for backer_event in &events[1..3] {
            assert_eq!(backer_event.actor.as_deref(), Some(ALICE));
            assert_eq!(backer_event.amount.as_deref(), Some("50"));
        }

        let completed = &events[3];
        assert_eq!(completed.actor, None);
        assert_eq!(completed.amount.as_deref(), Some("100"));
        assert_eq!(completed.timestamp, 1_704_067_215);
    }

    #[test]
    fn hard_rpc_error_is_not_retried() {
        let body = parse(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "method not found" }
        }));
        let err = body.error.unwrap();
        assert!(err.is_hard());
        assert!(matches!(
            IndexerError::from(err),
            IndexerError::Rpc { code: -32601, message } if message == "method not found"
        ));

        let soft = RpcError {
            code: -32603,
            message: "internal error".to_string(),
        };
        assert!(!soft.is_hard());
    }

    #[test]
    fn json_encoded_values_are_still_read() {
        let raw = raw_event(
            vec![
                r#"{"type":"symbol","value":"funded"}"#.to_string(),
                r#"{"type":"u64","value":"42"}"#.to_string(),
            ],
            json!({ "contributor": "GABC123", "amount": "5000" }),
        );

        let events = decode_events(&[raw], "CONTRACT1");
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.event_type, "funded");
        assert_eq!(ev.campaign_id.as_deref(), Some("42"));
        assert_eq!(ev.actor.as_deref(), Some("GABC123"));
        assert_eq!(ev.amount.as_deref(), Some("5000"));
        assert_eq!(ev.ledger, 1000);
        assert_eq!(ev.timestamp, 1_704_067_200);
    }

    #[test]
    fn undecodable_value_keeps_the_event_without_payload() {
        let raw = raw_event(
            vec![TOPIC_FUNDED.to_string(), TOPIC_CAMPAIGN_0.to_string()],
            json!("not xdr"),
        );

        let events = decode_events(&[raw], "CONTRACT1");
        assert_eq!(events[0].event_type, "funded");
        assert_eq!(events[0].actor, None);
        assert_eq!(events[0].amount, None);
    }

    #[test]
    fn failed_calls_are_skipped() {
        let mut raw = raw_event(
            vec![TOPIC_FUNDED.to_string(), TOPIC_CAMPAIGN_0.to_string()],
            json!(VALUE_FUNDED),
        );
        raw.in_successful_contract_call = Some(false);
        assert!(decode_events(&[raw], "CONTRACT1").is_empty());
    }

    #[test]
    fn tx_hash_is_normalised() {
        let upper = "AB".repeat(32);
        assert_eq!(normalize_tx_hash(&upper), "ab".repeat(32));
        assert_eq!(normalize_tx_hash("TX1"), "TX1");
    }

    #[test]
    fn build_params_prefers_cursor() {
        let with_cursor = build_params("C1", 10, Some("0000-1"), 100);
        assert_eq!(with_cursor["pagination"]["cursor"], "0000-1");
        assert!(with_cursor.get("startLedger").is_none());

        let fresh = build_params("C1", 10, None, 100);
        assert_eq!(fresh["startLedger"], 10);
        assert_eq!(fresh["filters"][0]["contractIds"][0], "C1");
    }

    #[test]
    fn parse_iso_timestamp() {
        let ts = parse_iso_to_unix("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, 1_704_067_200);
    }
}
