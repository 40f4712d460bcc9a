use foodnsap::FoodnsapError;
use serde_json::Value;

/// The request never got an HTTP answer.
pub(crate) fn transport(url: &str, e: reqwest::Error) -> FoodnsapError {
    FoodnsapError::Remote {
        status: 0,
        message: format!("request to {} failed: {}", url, e),
    }
}

/// Map a non-2xx response, preferring the `message` field of a PostgREST
/// error body.
pub(crate) async fn status(response: reqwest::Response) -> FoodnsapError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    FoodnsapError::Remote {
        status: status.as_u16(),
        message: error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
    }
}

fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(v) => v
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        Err(_) => Some(body.to_string()),
    }
}

pub(crate) fn decode(url: &str, e: reqwest::Error) -> FoodnsapError {
    FoodnsapError::Json(format!("unreadable response from {}: {}", url, e))
}
