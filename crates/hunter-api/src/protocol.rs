//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! Only the WebSocket transport is spoken, so every packet arrives as one
//! text frame: an Engine.IO type digit followed by its payload. Socket.IO
//! packets ride inside Engine.IO `message` packets.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   engine open
//! 2 / 3                                                     ping / pong
//! 40{"sid":".."}                                            namespace connect
//! 42["task_update",{"taskId":"t1","progress":40}]           event
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventError;

/// Namespace used when a packet names none.
pub const DEFAULT_NAMESPACE: &str = "/";

// ── Engine.IO ────────────────────────────────────────────────────────

/// Handshake data carried by the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, EventError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| EventError::Protocol("empty engine packet".into()))?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(Self::Open)
                .map_err(|e| EventError::Protocol(format!("bad open payload: {e}"))),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(rest.to_owned())),
            '3' => Ok(Self::Pong(rest.to_owned())),
            '4' => Ok(Self::Message(rest.to_owned())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(EventError::Protocol(format!(
                "unknown engine packet type '{other}'"
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Open(info) => {
                // OpenInfo holds only strings and integers; serialization cannot fail.
                let json = serde_json::to_string(info).unwrap_or_default();
                format!("0{json}")
            }
            Self::Close => "1".into(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(data) => format!("4{data}"),
            Self::Upgrade => "5".into(),
            Self::Noop => "6".into(),
        }
    }
}

// ── Socket.IO ────────────────────────────────────────────────────────

/// One Socket.IO packet (the payload of an Engine.IO `message`).
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Client request to join the default namespace.
    pub fn connect() -> Self {
        Self::Connect {
            namespace: DEFAULT_NAMESPACE.into(),
            data: None,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, EventError> {
        let mut chars = payload.chars();
        let kind = chars
            .next()
            .ok_or_else(|| EventError::Protocol("empty socket packet".into()))?;
        let rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(EventError::Protocol(
                "binary socket packets are not supported".into(),
            ));
        }

        let (namespace, rest) = split_namespace(rest);
        let (id, rest) = split_ack_id(rest);
        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(rest)
                    .map_err(|e| EventError::Protocol(format!("bad socket payload: {e}")))?,
            )
        };

        match kind {
            '0' => Ok(Self::Connect { namespace, data }),
            '1' => Ok(Self::Disconnect { namespace }),
            '2' => {
                let (name, args) = split_event(data)?;
                Ok(Self::Event {
                    namespace,
                    id,
                    name,
                    args,
                })
            }
            '3' => {
                let id = id.ok_or_else(|| EventError::Protocol("ack without id".into()))?;
                let args = match data {
                    Some(Value::Array(args)) => args,
                    _ => Vec::new(),
                };
                Ok(Self::Ack {
                    namespace,
                    id,
                    args,
                })
            }
            '4' => Ok(Self::ConnectError { namespace, data }),
            other => Err(EventError::Protocol(format!(
                "unknown socket packet type '{other}'"
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Connect { namespace, data } => {
                format!("0{}{}", namespace_prefix(namespace), json_or_empty(data.as_ref()))
            }
            Self::Disconnect { namespace } => format!("1{}", namespace_prefix(namespace)),
            Self::Event {
                namespace,
                id,
                name,
                args,
            } => {
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(name.clone()));
                array.extend(args.iter().cloned());
                format!(
                    "2{}{}{}",
                    namespace_prefix(namespace),
                    id.map(|i| i.to_string()).unwrap_or_default(),
                    Value::Array(array)
                )
            }
            Self::Ack {
                namespace,
                id,
                args,
            } => format!(
                "3{}{id}{}",
                namespace_prefix(namespace),
                Value::Array(args.clone())
            ),
            Self::ConnectError { namespace, data } => {
                format!("4{}{}", namespace_prefix(namespace), json_or_empty(data.as_ref()))
            }
        }
    }

    /// Human-readable reason carried by a `CONNECT_ERROR`.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::ConnectError { data, .. } => Some(match data {
                Some(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| Value::Object(map.clone()).to_string(), str::to_owned),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "connection refused".into(),
            }),
            _ => None,
        }
    }
}

fn split_namespace(rest: &str) -> (String, &str) {
    if rest.starts_with('/') {
        match rest.split_once(',') {
            Some((ns, tail)) => (ns.to_owned(), tail),
            None => (rest.to_owned(), ""),
        }
    } else {
        (DEFAULT_NAMESPACE.to_owned(), rest)
    }
}

fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, rest);
    }
    let (id, tail) = rest.split_at(digits);
    (id.parse().ok(), tail)
}

fn split_event(data: Option<Value>) -> Result<(String, Vec<Value>), EventError> {
    let Some(Value::Array(mut items)) = data else {
        return Err(EventError::Protocol("event payload is not an array".into()));
    };
    if items.is_empty() {
        return Err(EventError::Protocol("event payload has no name".into()));
    }
    match items.remove(0) {
        Value::String(name) => Ok((name, items)),
        other => Err(EventError::Protocol(format!("event name is not a string: {other}"))),
    }
}

fn namespace_prefix(namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        String::new()
    } else {
        format!("{namespace},")
    }
}

fn json_or_empty(data: Option<&Value>) -> String {
    data.map(Value::to_string).unwrap_or_default()
}
