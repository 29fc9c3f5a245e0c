use std::env;
use std::net::{IpAddr, Ipv4Addr};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = match env::var("HOST") {
            Ok(host) => host.parse().context("HOST must be an IP address")?,
            Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        Ok(Self {
            host,
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        })
    }
}
