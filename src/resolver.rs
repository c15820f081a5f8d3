//! SRV resolution: the exchange seam, the lookup built on it, and the
//! network exchanger used in production.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::runtime::{TokioRuntimeProvider, TokioTime};
use hickory_proto::tcp::TcpClientStream;
use hickory_proto::udp::UdpClientStream;
use hickory_proto::xfer::{
    DnsExchange, DnsExchangeBackground, DnsHandle, DnsMultiplexer, DnsRequest, DnsRequestOptions,
    DnsRequestSender, FirstAnswer,
};
use hickory_proto::{ProtoError, ProtoErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ExchangeError, RedirectError};
use crate::metrics;

/// An endpoint taken from one SRV answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    target: String,
    port: u16,
}

impl Candidate {
    pub fn new(target: impl Into<String>, port: u16) -> Self {
        Self {
            target: target.into(),
            port,
        }
    }

    /// Target host exactly as it appeared in the record, trailing dot included.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://<target>:<port>`
    pub fn location(&self) -> String {
        format!("http://{}:{}", self.target, self.port)
    }
}

/// A completed exchange: the response and how long it took.
#[derive(Debug, Clone)]
pub struct Exchanged {
    pub response: Message,
    pub elapsed: Duration,
}

/// Sends one DNS query and returns the server's answer.
///
/// This is the only network boundary of the redirector. Dropping the
/// returned future must abandon any outstanding I/O.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange(&self, query: &Message) -> Result<Exchanged, ExchangeError>;
}

/// Adapts a plain function into an [`Exchange`].
pub struct ExchangeFn<F>(F);

impl<F> ExchangeFn<F>
where
    F: Fn(&Message) -> Result<Message, ExchangeError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Exchange for ExchangeFn<F>
where
    F: Fn(&Message) -> Result<Message, ExchangeError> + Send + Sync,
{
    async fn exchange(&self, query: &Message) -> Result<Exchanged, ExchangeError> {
        let started = Instant::now();
        let response = (self.0)(query)?;
        Ok(Exchanged {
            response,
            elapsed: started.elapsed(),
        })
    }
}

/// Builds an `IN SRV` query for `name` with recursion desired.
pub fn srv_query(name: Name) -> Message {
    let mut query = Query::new();
    query.set_name(name);
    query.set_query_type(RecordType::SRV);
    query.set_query_class(DNSClass::IN);

    let mut msg = Message::new();
    msg.set_id(rand::random());
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(true);
    msg.add_query(query);
    msg
}

/// Resolves `fqdn` to its SRV candidates, in the order the server returned
/// them. Only answers whose owner name is exactly `fqdn` are kept.
pub async fn lookup_srv(exchange: &dyn Exchange, fqdn: &str) -> Result<Vec<Candidate>, RedirectError> {
    let name = Name::from_ascii(fqdn).map_err(|source| RedirectError::InvalidName {
        name: fqdn.to_string(),
        source,
    })?;

    let Exchanged { response, elapsed } = exchange.exchange(&srv_query(name)).await?;
    metrics::record_exchange(elapsed);
    trace!(name = fqdn, ?elapsed, answers = response.answers().len(), "SRV exchange complete");

    match response.response_code() {
        ResponseCode::NoError | ResponseCode::NXDomain => {}
        code => return Err(ExchangeError::ResponseCode(code).into()),
    }

    let candidates: Vec<Candidate> = response
        .answers()
        .iter()
        .filter(|record| record.name().to_ascii() == fqdn)
        .filter_map(|record| match record.data() {
            RData::SRV(srv) => Some(Candidate::new(srv.target().to_ascii(), srv.port())),
            _ => None,
        })
        .collect();

    if candidates.is_empty() {
        return Err(RedirectError::NoRecords(fqdn.to_string()));
    }
    Ok(candidates)
}

/// Resolver client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// DNS server queried for SRV records.
    #[serde(default = "default_nameserver")]
    pub nameserver: SocketAddr,

    /// Upper bound on one exchange, UDP and TCP retry included.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry over TCP when the UDP answer is truncated.
    #[serde(default = "default_tcp_fallback")]
    pub tcp_fallback: bool,
}

fn default_nameserver() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 53))
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_tcp_fallback() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nameserver: default_nameserver(),
            timeout_ms: default_timeout_ms(),
            tcp_fallback: default_tcp_fallback(),
        }
    }
}

/// Exchanges queries with a single nameserver over UDP, retrying over TCP
/// on truncation.
///
/// Each exchange opens a fresh hickory client stream. The UDP side assigns
/// its own message id and drops datagrams whose source, id or question
/// section does not match the query.
#[derive(Debug, Clone)]
pub struct UdpExchanger {
    nameserver: SocketAddr,
    timeout: Duration,
    tcp_fallback: bool,
}

impl UdpExchanger {
    pub fn new(nameserver: SocketAddr, timeout: Duration) -> Self {
        Self {
            nameserver,
            timeout,
            tcp_fallback: true,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.nameserver, Duration::from_millis(config.timeout_ms))
            .with_tcp_fallback(config.tcp_fallback)
    }

    pub fn with_tcp_fallback(mut self, enabled: bool) -> Self {
        self.tcp_fallback = enabled;
        self
    }

    async fn round_trip(&self, query: &Message) -> Result<Message, ExchangeError> {
        let response = self.exchange_udp(query).await.map_err(|e| self.classify(e))?;
        if response.truncated() && self.tcp_fallback {
            debug!(nameserver = %self.nameserver, "truncated UDP response, retrying over TCP");
            return self.exchange_tcp(query).await.map_err(|e| self.classify(e));
        }
        Ok(response)
    }

    async fn exchange_udp(&self, query: &Message) -> Result<Message, ProtoError> {
        let stream = UdpClientStream::builder(self.nameserver, TokioRuntimeProvider::new())
            .with_timeout(Some(self.timeout))
            .build();
        let (client, background) = DnsExchange::connect::<_, _, TokioTime>(stream).await?;
        send_first(client, background, query).await
    }

    async fn exchange_tcp(&self, query: &Message) -> Result<Message, ProtoError> {
        let (stream, handle) = TcpClientStream::new(
            self.nameserver,
            None,
            Some(self.timeout),
            TokioRuntimeProvider::new(),
        );
        let multiplexer = DnsMultiplexer::with_timeout(stream, handle, self.timeout, None);
        let (client, background) = DnsExchange::connect::<_, _, TokioTime>(multiplexer).await?;
        send_first(client, background, query).await
    }

    fn classify(&self, err: ProtoError) -> ExchangeError {
        match err.kind() {
            ProtoErrorKind::Timeout => ExchangeError::Timeout(self.timeout),
            _ => err.into(),
        }
    }
}

/// Drives `background` while `client` waits for the first answer to `query`.
async fn send_first<S>(
    client: DnsExchange,
    background: DnsExchangeBackground<S, TokioTime>,
    query: &Message,
) -> Result<Message, ProtoError>
where
    S: DnsRequestSender + Send + Unpin + 'static,
{
    let background = tokio::spawn(background);
    let request = DnsRequest::new(query.clone(), DnsRequestOptions::default());
    let answer = client.send(request).first_answer().await;
    background.abort();
    Ok(answer?.into_message())
}

#[async_trait]
impl Exchange for UdpExchanger {
    async fn exchange(&self, query: &Message) -> Result<Exchanged, ExchangeError> {
        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.round_trip(query))
            .await
            .map_err(|_| ExchangeError::Timeout(self.timeout))??;
        Ok(Exchanged {
            response,
            elapsed: started.elapsed(),
        })
    }
}
