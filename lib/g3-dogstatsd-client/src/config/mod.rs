/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
#[cfg(unix)]
use std::path::PathBuf;

use thiserror::Error;

use crate::DogstatsdClient;
use crate::backend::MetricsBackend;
use crate::emitter::MetricsEmitter;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_PORT: u16 = 8125;
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_THREAD_NAME: &str = "statsd-emit";

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("socket error: {0:?}")]
    SocketError(io::Error),
    #[error("failed to spawn emit thread: {0:?}")]
    SpawnError(io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DogstatsdBackend {
    Udp(SocketAddr, Option<IpAddr>),
    #[cfg(unix)]
    Unix(PathBuf),
}

impl Default for DogstatsdBackend {
    fn default() -> Self {
        DogstatsdBackend::Udp(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            None,
        )
    }
}

impl DogstatsdBackend {
    /// Resolve `host` once and target the first address it maps to.
    pub fn resolve_udp(host: &str, port: u16) -> io::Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::other("no address resolved"))?;
        Ok(DogstatsdBackend::Udp(addr, None))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogstatsdClientConfig {
    pub backend: DogstatsdBackend,
    pub prefix: String,
    pub channel_capacity: usize,
    pub thread_name: String,
}

impl Default for DogstatsdClientConfig {
    fn default() -> Self {
        DogstatsdClientConfig::with_prefix(String::new())
    }
}

impl DogstatsdClientConfig {
    pub fn with_prefix(prefix: String) -> Self {
        DogstatsdClientConfig {
            backend: DogstatsdBackend::default(),
            prefix,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    pub fn set_backend(&mut self, target: DogstatsdBackend) {
        self.backend = target;
    }

    pub fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }

    pub fn set_channel_capacity(&mut self, capacity: usize) {
        self.channel_capacity = capacity;
    }

    pub fn set_thread_name(&mut self, name: String) {
        self.thread_name = name;
    }

    /// Create the backend socket and spawn the emit thread.
    pub fn build(&self) -> Result<DogstatsdClient, ClientBuildError> {
        let backend = match &self.backend {
            DogstatsdBackend::Udp(addr, bind) => {
                MetricsBackend::udp(*addr, *bind).map_err(ClientBuildError::SocketError)?
            }
            #[cfg(unix)]
            DogstatsdBackend::Unix(path) => {
                MetricsBackend::unix(path.clone()).map_err(ClientBuildError::SocketError)?
            }
        };
        let emitter = MetricsEmitter::spawn(backend, self.channel_capacity, &self.thread_name)
            .map_err(ClientBuildError::SpawnError)?;
        Ok(DogstatsdClient::new(self.prefix.clone(), emitter))
    }
}
