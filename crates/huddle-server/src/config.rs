//! Runtime configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

/// Command-line and environment configuration for the relay server.
#[derive(Debug, Clone, Parser)]
#[command(name = "huddle-server", about = "Huddle chat relay server", version)]
pub struct Config {
    /// TCP port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_addr: IpAddr,

    /// Extra comma-separated words for the content filter
    #[arg(long, env = "HUDDLE_DENY_WORDS", value_delimiter = ',')]
    pub deny_words: Vec<String>,
}

impl Config {
    /// The socket address to bind the listener to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
