//! Canonical request model and the POST wire envelope.

use axum::http::{request::Parts, HeaderMap, Method, Uri};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Envelope key used when the wire format carries a single request.
pub const DEFAULT_REQUEST_ID: &str = "g0";

/// Separator between the handler namespace and the sub-resource (`ns.sub`).
pub const NAMESPACE_SEPARATOR: char = '.';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Create and update carry a body; read and delete do not.
    pub fn takes_body(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Operation::Create),
            "read" => Ok(Operation::Read),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(format!("unknown operation: {}", s)),
        }
    }
}

/// A request parameter: a single string or an ordered list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::One(s) => Some(s.as_str()),
            ParamValue::Many(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            ParamValue::One(s) => std::slice::from_ref(s),
            ParamValue::Many(v) => v.as_slice(),
        }
    }

    /// Add another occurrence of the same key, turning a single value into a list.
    pub fn push(&mut self, value: String) {
        match self {
            ParamValue::One(first) => {
                let first = std::mem::take(first);
                *self = ParamValue::Many(vec![first, value]);
            }
            ParamValue::Many(v) => v.push(value),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::One(s) => s.serialize(serializer),
            ParamValue::Many(v) => v.serialize(serializer),
        }
    }
}

fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err("param values must be strings or lists of strings".into()),
    }
}

impl TryFrom<Value> for ParamValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(ParamValue::Many(
                items.into_iter().map(scalar_to_string).collect::<Result<_, _>>()?,
            )),
            other => scalar_to_string(other).map(ParamValue::One),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::One(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::One(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::Many(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        ParamValue::Many(v.into_iter().map(String::from).collect())
    }
}

pub type Params = BTreeMap<String, ParamValue>;

/// Caller-supplied per-call metadata forwarded to fetchers, never used for routing.
pub type Context = Map<String, Value>;

/// Transport-level request data handed to fetchers (method, uri, headers).
/// Empty for in-process calls.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl From<&Parts> for RequestContext {
    fn from(parts: &Parts) -> Self {
        RequestContext {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }
}

/// Canonical unit of work routed by the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub id: String,
    pub resource: String,
    pub operation: Operation,
    pub params: Params,
    pub body: Option<Value>,
    pub context: Context,
}

impl Request {
    pub fn new(resource: impl Into<String>, operation: Operation) -> Self {
        Request {
            id: DEFAULT_REQUEST_ID.to_string(),
            resource: resource.into(),
            operation,
            params: Params::new(),
            body: None,
            context: Context::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Registry key: the part of the resource before the first namespace separator.
    pub fn lookup_key(&self) -> &str {
        self.resource
            .split(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or_default()
    }
}

/// One entry of the POST `requests` map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubRequest {
    pub resource: String,
    pub operation: Operation,
    #[serde(default)]
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// `requests` may also arrive as `null` or `[]`; both mean "no requests".
fn requests_map<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, SubRequest>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(None),
        Value::Object(entries) => serde_json::from_value(Value::Object(entries))
            .map(Some)
            .map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "requests must be a map of id to request, got {}",
            other
        ))),
    }
}

/// POST body: `{ requests: { <id>: SubRequest }, context: {...} }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, deserialize_with = "requests_map")]
    pub requests: Option<BTreeMap<String, SubRequest>>,
    #[serde(default)]
    pub context: Option<Context>,
}

impl RequestEnvelope {
    pub fn single(request: &Request) -> Self {
        let mut requests = BTreeMap::new();
        requests.insert(
            request.id.clone(),
            SubRequest {
                resource: request.resource.clone(),
                operation: request.operation,
                params: request.params.clone(),
                body: request.body.clone(),
            },
        );
        RequestEnvelope {
            requests: Some(requests),
            context: Some(request.context.clone()),
        }
    }

    /// Extract the one request this envelope carries. `None` when `requests` is empty or absent.
    /// Only one entry is dispatched per call: the `g0` entry when present, else the first by id.
    pub fn into_single(self) -> Option<Request> {
        let mut requests = self.requests.unwrap_or_default();
        if requests.len() > 1 {
            tracing::warn!(
                count = requests.len(),
                "request envelope carries several entries; only one is dispatched"
            );
        }
        let (id, sub) = match requests.remove_entry(DEFAULT_REQUEST_ID) {
            Some(entry) => entry,
            None => requests.pop_first()?,
        };
        Some(Request {
            id,
            resource: sub.resource,
            operation: sub.operation,
            params: sub.params,
            body: sub.body,
            context: self.context.unwrap_or_default(),
        })
    }
}
