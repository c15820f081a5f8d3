//! srv-redirector - answers HTTP requests with a redirect to one of the
//! endpoints published in a service's DNS SRV records.
//!
//! ```text
//! GET /_http._tcp.example.com
//!   → normalize to `_http._tcp.example.com.`
//!   → IN SRV query via the configured nameserver
//!   → pick one answer (round-robin or seeded random)
//!   → 303 See Other, Location: http://<target>:<port>
//! ```
//!
//! Unknown names, failed lookups and malformed requests all get an empty
//! `400 Bad Request`. Nothing is cached: every request performs a fresh
//! lookup.

pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod name;
pub mod redirector;
pub mod resolver;
pub mod server;
pub mod strategies;
pub mod telemetry;

pub use config::Config;
pub use error::{ExchangeError, RedirectError, RedirectorError};
pub use extractor::{HeaderExtractor, NameExtractor, PathExtractor};
pub use redirector::RedirectHandler;
pub use resolver::{Candidate, Exchange, ExchangeFn, Exchanged, UdpExchanger};
pub use server::RedirectServer;
pub use strategies::{RandomStrategy, RoundRobinStrategy, SelectionStrategy};
