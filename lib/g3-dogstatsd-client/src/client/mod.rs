/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use thiserror::Error;

use crate::emitter::MetricsEmitter;
use crate::{ClientStats, DogstatsdTagGroup};

mod formatter;
pub use formatter::MetricFormatter;

mod service_check;
pub use service_check::{CheckStatus, ServiceCheckFormatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("metric name is empty")]
    EmptyName,
    #[error("metric value is not finite")]
    NonFiniteValue,
}

pub struct DogstatsdClient {
    prefix: String,
    tags: DogstatsdTagGroup,
    emitter: MetricsEmitter,
}

impl DogstatsdClient {
    pub(crate) fn new(prefix: String, emitter: MetricsEmitter) -> Self {
        DogstatsdClient {
            prefix,
            tags: Default::default(),
            emitter,
        }
    }

    pub fn with_tag<T: AsRef<str>>(mut self, key: &str, value: T) -> Self {
        self.tags.add_tag(key, value);
        self
    }

    pub fn with_tag_value<T: AsRef<str>>(mut self, value: T) -> Self {
        self.tags.add_tag_value(value);
        self
    }

    pub fn stats(&self) -> Arc<ClientStats> {
        Arc::clone(self.emitter.stats())
    }

    /// Shut down the io thread and release the socket. Queued messages
    /// are dropped, not flushed. Safe to call more than once; metric
    /// calls made afterwards deliver nothing and count as
    /// channel_closed drops.
    pub fn stop(&self) {
        self.emitter.stop();
    }

    pub(crate) fn emit(&self, msg: Vec<u8>) {
        self.emitter.emit(msg);
    }

    pub(crate) fn handle_invalid_input(&self) {
        self.emitter.stats().drop.add_invalid_input();
    }
}

impl Drop for DogstatsdClient {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::net::UdpSocket;
    use std::time::Duration;

    use super::DogstatsdClient;
    use crate::{DogstatsdBackend, DogstatsdClientConfig};

    pub(crate) fn udp_pair(prefix: &str) -> (UdpSocket, DogstatsdClient) {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        server
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let mut config = DogstatsdClientConfig::with_prefix(prefix.to_string());
        config.set_backend(DogstatsdBackend::Udp(server.local_addr().unwrap(), None));
        let client = config.build().unwrap();
        (server, client)
    }

    pub(crate) fn recv_msg(socket: &UdpSocket) -> Vec<u8> {
        let mut buf = [0u8; 1024];
        let (len, _addr) = socket.recv_from(&mut buf).unwrap();
        buf[..len].to_vec()
    }
}
