use axum::body::Body;
use axum::http::Request;

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn review(
    operation: &str,
    user: serde_json::Value,
    object: Option<serde_json::Value>,
    old_object: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "uid": "review-1",
        "operation": operation,
        "user": user,
    });
    if let Some(object) = object {
        body["object"] = object;
    }
    if let Some(old_object) = old_object {
        body["old_object"] = old_object;
    }
    body
}
