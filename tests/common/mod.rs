//! Shared test infrastructure for redirector integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::rdata::SRV;
use hickory_proto::rr::{Name, RData, Record};
use http::header::HOST;
use http::StatusCode;
use hyper::{Body, Request};
use tokio::sync::Notify;

use srv_redirector::strategies::{StrategyConfig, StrategyKind};
use srv_redirector::{
    Exchange, ExchangeError, Exchanged, HeaderExtractor, NameExtractor, PathExtractor,
    RedirectHandler,
};

// --- Constants ---

pub const SERVICE: &str = "_abc._tcp.domain.";
pub const TARGET: &str = "abc.domain.";
pub const PORTS: [u16; 4] = [5000, 5001, 5002, 5003];

// --- DNS message helpers ---

/// Build an SRV record owned by `owner`.
pub fn srv_record(owner: &str, target: &str, port: u16) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).unwrap(),
        60,
        RData::SRV(SRV::new(10, 10, port, Name::from_ascii(target).unwrap())),
    )
}

/// The four `abc.domain.` endpoints owned by `owner`.
pub fn service_records(owner: &str) -> Vec<Record> {
    PORTS.iter().map(|&port| srv_record(owner, TARGET, port)).collect()
}

/// Build a response to `query` carrying `answers`.
pub fn reply(query: &Message, answers: Vec<Record>) -> Message {
    let mut msg = Message::new();
    msg.set_id(query.id());
    msg.set_message_type(MessageType::Response);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(query.recursion_desired());
    msg.add_queries(query.queries().to_vec());
    msg.add_answers(answers);
    msg
}

/// Name of the first question, as text.
pub fn question_name(query: &Message) -> String {
    query.queries()[0].name().to_ascii()
}

// --- MockExchange ---

/// Answers from a fixed zone keyed by question name and counts calls.
#[derive(Clone, Default)]
pub struct MockExchange {
    zone: Arc<HashMap<String, Vec<Record>>>,
    calls: Arc<AtomicUsize>,
}

impl MockExchange {
    /// Zone containing the four endpoints under [`SERVICE`].
    pub fn new() -> Self {
        Self::with_zone([(SERVICE, service_records(SERVICE))])
    }

    pub fn with_zone<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<Record>)>) -> Self {
        Self {
            zone: Arc::new(
                entries
                    .into_iter()
                    .map(|(name, records)| (name.to_string(), records))
                    .collect(),
            ),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn exchange(&self, query: &Message) -> Result<Exchanged, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answers = self
            .zone
            .get(&question_name(query))
            .cloned()
            .unwrap_or_default();
        Ok(Exchanged {
            response: reply(query, answers),
            elapsed: Default::default(),
        })
    }
}

/// Always fails like an unreachable nameserver.
pub struct FailingExchange;

#[async_trait]
impl Exchange for FailingExchange {
    async fn exchange(&self, _query: &Message) -> Result<Exchanged, ExchangeError> {
        Err(ExchangeError::Io(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

/// Holds lookups for names starting with `_slow` until the gate opens.
pub struct GatedExchange {
    pub inner: MockExchange,
    pub gate: Arc<Notify>,
}

#[async_trait]
impl Exchange for GatedExchange {
    async fn exchange(&self, query: &Message) -> Result<Exchanged, ExchangeError> {
        if question_name(query).starts_with("_slow") {
            self.gate.notified().await;
        }
        self.inner.exchange(query).await
    }
}

// --- Handler construction ---

#[derive(Clone, Copy, Debug)]
pub enum Param {
    Path,
    Host,
}

pub fn extractor(param: Param) -> Arc<dyn NameExtractor> {
    match param {
        Param::Path => Arc::new(PathExtractor::new("/")),
        Param::Host => Arc::new(HeaderExtractor::new(HOST)),
    }
}

pub fn round_robin(seed: u64) -> StrategyConfig {
    StrategyConfig {
        kind: StrategyKind::RoundRobin,
        seed,
    }
}

pub fn random(seed: u64) -> StrategyConfig {
    StrategyConfig {
        kind: StrategyKind::Random,
        seed,
    }
}

pub fn build_handler(
    exchange: Arc<dyn Exchange>,
    code: u16,
    strategy: StrategyConfig,
    param: Param,
) -> RedirectHandler {
    RedirectHandler::new(
        exchange,
        "/",
        StatusCode::from_u16(code).unwrap(),
        strategy.build(),
        extractor(param),
    )
}

/// `GET http://<name>/<name>` with a matching `Host` header.
pub fn request_for(name: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("http://{}/{}", name, name))
        .header(HOST, name)
        .body(Body::empty())
        .unwrap()
}

/// Location URL for the given port.
pub fn location(port: u16) -> String {
    format!("http://{}:{}", TARGET, port)
}
