//! Demo server for the live grid
//! Serves synthetic users over the channel interface

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use lg_core::channel::{GET_ROWS, ROW_SELECTED};
use lg_core::{Channel, ChannelError, RowWindowRequest, SortDirection};

const STATUSES: [&str; 3] = ["active", "pending", "disabled"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// In-memory server answering `get_rows` and recording row selections
pub struct DemoServer {
    rows: Vec<Value>,
    latency: Duration,
    selected: Mutex<Vec<String>>,
}

impl DemoServer {
    /// Create a server holding `total_rows` synthetic users
    pub fn new(total_rows: usize, latency: Duration) -> Self {
        let rows = (0..total_rows).map(generate_user).collect();
        Self {
            rows,
            latency,
            selected: Mutex::new(Vec::new()),
        }
    }

    /// Column definitions for the users grid
    pub fn column_defs() -> Vec<Value> {
        vec![
            json!({"field": "name", "headerName": "Name"}),
            json!({"field": "email", "headerName": "Email", "type": "maybeEmptyFormatter"}),
            json!({"field": "status", "headerName": "Status"}),
            json!({"field": "inserted_at", "headerName": "Joined", "type": "dateFormatter"}),
        ]
    }

    /// Monthly signup counts, shifted by `seed` so consecutive datasets differ
    pub fn chart_data(seed: u64) -> Vec<Value> {
        MONTHS
            .iter()
            .enumerate()
            .map(|(i, month)| {
                let count = (i as u64 * 7 + seed * 13) % 50 + 5;
                json!({"month": month, "count": count})
            })
            .collect()
    }

    /// UUIDs pushed through `row-selected`
    pub fn selected(&self) -> Vec<String> {
        self.selected.lock().clone()
    }

    /// Answer one row window request
    pub fn query(&self, request: &RowWindowRequest) -> Value {
        let mut matching: Vec<&Value> = self
            .rows
            .iter()
            .filter(|row| {
                request
                    .filters
                    .iter()
                    .all(|(column, spec)| matches_filter(&row[column.as_str()], spec))
            })
            .collect();

        if !request.sort_model.is_empty() {
            matching.sort_by(|a, b| {
                request
                    .sort_model
                    .iter()
                    .map(|spec| {
                        let column = spec.col_id.as_str();
                        let ord = compare_values(&a[column], &b[column]);
                        match spec.sort {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matching.len();
        let start = (request.start_row as usize).min(total);
        let end = (request.end_row as usize).min(total);
        let row_data: Vec<Value> = matching[start..end].iter().map(|r| (*r).clone()).collect();

        json!({"row_data": row_data, "row_count": total})
    }
}

#[async_trait]
impl Channel for DemoServer {
    async fn request(&self, event: &str, payload: Value) -> Result<Value, ChannelError> {
        tokio::time::sleep(self.latency).await;

        match event {
            GET_ROWS => {
                let request: RowWindowRequest = serde_json::from_value(payload)
                    .map_err(|e| ChannelError::Transport(e.to_string()))?;
                debug!(
                    "Serving rows {}..{} with {} filters",
                    request.start_row,
                    request.end_row,
                    request.filters.len()
                );
                Ok(self.query(&request))
            }
            other => Err(ChannelError::Transport(format!("no handler for '{}'", other))),
        }
    }

    fn push(&self, event: &str, payload: Value) -> Result<(), ChannelError> {
        if event == ROW_SELECTED {
            if let Some(uuid) = payload.get("uuid").and_then(|v| v.as_str()) {
                info!("Row selected: {}", uuid);
                self.selected.lock().push(uuid.to_string());
            }
        }
        Ok(())
    }
}

/// Page anchors of the demo page
pub fn page_anchors() -> HashMap<String, String> {
    let mut anchors = HashMap::new();
    anchors.insert("csrf-token".to_string(), Uuid::new_v4().simple().to_string());
    anchors
}

fn generate_user(i: usize) -> Value {
    let email = if i % 7 == 0 {
        Value::Null
    } else {
        json!(format!("user{}@example.com", i))
    };

    json!({
        "id": i,
        "uuid": Uuid::from_u128(0x5eed_0000_0000_0000_0000_0000_0000_0000 + i as u128).to_string(),
        "name": format!("User {:04}", i),
        "email": email,
        "status": STATUSES[i % STATUSES.len()],
        "inserted_at": format!(
            "2024-{:02}-{:02}T{:02}:{:02}:00Z",
            i % 12 + 1,
            i % 28 + 1,
            i % 24,
            (i * 7) % 60
        ),
    })
}

/// A filter is either a plain value or an object carrying `filter` and an
/// optional `type` of `equals` (default) or `contains`.
fn matches_filter(value: &Value, spec: &Value) -> bool {
    let Some(object) = spec.as_object() else {
        return value == spec;
    };

    let Some(expected) = object.get("filter") else {
        return true;
    };

    match object.get("type").and_then(|t| t.as_str()).unwrap_or("equals") {
        "contains" => match (value.as_str(), expected.as_str()) {
            (Some(haystack), Some(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        },
        _ => value == expected,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_core::{FilterState, RequestToken, SortSpec};

    fn request(
        start: u64,
        end: u64,
        sort: Vec<SortSpec>,
        filters: FilterState,
    ) -> RowWindowRequest {
        RowWindowRequest::new(RequestToken::default(), start, end, sort, filters).unwrap()
    }

    #[test]
    fn test_paging() {
        let server = DemoServer::new(500, Duration::ZERO);
        let reply = server.query(&request(0, 50, Vec::new(), FilterState::new()));
        assert_eq!(reply["row_data"].as_array().unwrap().len(), 50);
        assert_eq!(reply["row_count"], json!(500));

        let tail = server.query(&request(480, 580, Vec::new(), FilterState::new()));
        assert_eq!(tail["row_data"].as_array().unwrap().len(), 20);
    }

    #[test]
    fn test_status_filter() {
        let server = DemoServer::new(300, Duration::ZERO);
        let mut filters = FilterState::new();
        filters.insert("status", json!("active"));

        let reply = server.query(&request(0, 1000, Vec::new(), filters));
        let rows = reply["row_data"].as_array().unwrap();
        assert_eq!(reply["row_count"], json!(100));
        assert!(rows.iter().all(|r| r["status"] == json!("active")));
    }

    #[test]
    fn test_contains_filter() {
        let server = DemoServer::new(50, Duration::ZERO);
        let mut filters = FilterState::new();
        filters.insert("name", json!({"type": "contains", "filter": "user 001"}));

        let reply = server.query(&request(0, 100, Vec::new(), filters));
        assert_eq!(reply["row_count"], json!(10));
    }

    #[test]
    fn test_descending_sort() {
        let server = DemoServer::new(20, Duration::ZERO);
        let reply = server.query(&request(
            0,
            3,
            vec![SortSpec::new("id", SortDirection::Desc)],
            FilterState::new(),
        ));
        let ids: Vec<_> = reply["row_data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![19, 18, 17]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_round_trip() {
        let server = DemoServer::new(10, Duration::from_millis(30));
        let reply = server
            .request(
                GET_ROWS,
                json!({"start_row": 0, "end_row": 5, "sort_model": [], "filters": {}}),
            )
            .await
            .unwrap();
        assert_eq!(reply["row_data"].as_array().unwrap().len(), 5);

        let err = server.request("delete_everything", json!({})).await;
        assert!(matches!(err, Err(ChannelError::Transport(_))));
    }

    #[test]
    fn test_row_selected_recorded() {
        let server = DemoServer::new(1, Duration::ZERO);
        server.push(ROW_SELECTED, json!({"uuid": "abc"})).unwrap();
        server.push("something-else", json!({"uuid": "zzz"})).unwrap();
        assert_eq!(server.selected(), vec!["abc".to_string()]);
    }
}
