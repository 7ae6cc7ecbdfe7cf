/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, SocketAddr};
#[cfg(unix)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
mod buf;
#[cfg(test)]
use buf::BufMetricsBackend;

mod udp;
use udp::UdpMetricsBackend;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::UnixMetricsBackend;

pub(crate) enum MetricsBackend {
    #[cfg(test)]
    Buf(BufMetricsBackend),
    Udp(UdpMetricsBackend),
    #[cfg(unix)]
    Unix(UnixMetricsBackend),
}

impl MetricsBackend {
    #[cfg(test)]
    pub(crate) fn buf(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        MetricsBackend::Buf(BufMetricsBackend::new(buf))
    }

    pub(crate) fn udp(peer: SocketAddr, bind_ip: Option<IpAddr>) -> io::Result<Self> {
        let backend = UdpMetricsBackend::new(peer, bind_ip)?;
        Ok(MetricsBackend::Udp(backend))
    }

    #[cfg(unix)]
    pub(crate) fn unix(path: PathBuf) -> io::Result<Self> {
        let backend = UnixMetricsBackend::new(path)?;
        Ok(MetricsBackend::Unix(backend))
    }

    pub(crate) fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        match self {
            #[cfg(test)]
            MetricsBackend::Buf(b) => b.send_msg(msg),
            MetricsBackend::Udp(b) => b.send_msg(msg),
            #[cfg(unix)]
            MetricsBackend::Unix(b) => b.send_msg(msg),
        }
    }
}
