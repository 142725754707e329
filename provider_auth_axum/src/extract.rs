use axum::body::{Body, to_bytes};
use axum::extract::Request;
use http::StatusCode;
use provider_auth::{BodyParser, RouteSpec, StrategyRequest};
use serde_json::{Map, Value};
use url::form_urlencoded;

const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// Turn an incoming request on `route` into the request a strategy sees.
pub(super) async fn strategy_request(
    req: Request,
    route: &RouteSpec,
) -> Result<StrategyRequest, (StatusCode, String)> {
    let (parts, body) = req.into_parts();

    let mut request = StrategyRequest::new(route.method, parts.uri.path());
    if let Some(query) = parts.uri.query() {
        request.query = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
    }
    request.headers = parts.headers;

    if let Some(parser) = route.body_parser {
        request.body = Some(read_body(body, parser, body_limit(route)).await?);
    }

    Ok(request)
}

async fn read_body(
    body: Body,
    parser: BodyParser,
    limit: usize,
) -> Result<Value, (StatusCode, String)> {
    let bytes = to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!("Failed to read request body: {}", e);
        (StatusCode::BAD_REQUEST, format!("Failed to read body: {e}"))
    })?;
    parse_body(parser, &bytes)
}

pub(super) fn parse_body(parser: BodyParser, bytes: &[u8]) -> Result<Value, (StatusCode, String)> {
    match parser {
        BodyParser::Json if bytes.iter().all(u8::is_ascii_whitespace) => {
            Ok(Value::Object(Map::new()))
        }
        BodyParser::Json => serde_json::from_slice(bytes)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}"))),
        BodyParser::Urlencoded => Ok(Value::Object(
            form_urlencoded::parse(bytes)
                .into_owned()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )),
        BodyParser::Text => std::str::from_utf8(bytes)
            .map(|text| Value::String(text.to_string()))
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Body is not UTF-8: {e}"))),
        BodyParser::Raw => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// `bodyParserOptions.limit` as a byte count: a number, or a string such as "100kb".
fn body_limit(route: &RouteSpec) -> usize {
    route
        .body_parser_options
        .as_ref()
        .and_then(|options| options.get("limit"))
        .and_then(|limit| match limit {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => parse_size(s),
            _ => None,
        })
        .unwrap_or(DEFAULT_BODY_LIMIT)
}

fn parse_size(size: &str) -> Option<usize> {
    let size = size.trim().to_lowercase();
    let split = size
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(size.len());
    let (digits, unit) = size.split_at(split);
    let value: usize = digits.parse().ok()?;
    let factor = match unit.trim() {
        "" | "b" => 1,
        "kb" => 1024,
        "mb" => 1024 * 1024,
        _ => return None,
    };
    value.checked_mul(factor)
}
