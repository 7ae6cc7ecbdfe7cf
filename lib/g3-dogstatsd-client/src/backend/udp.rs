/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

pub(super) struct UdpMetricsBackend {
    addr: SocketAddr,
    socket: UdpSocket,
}

impl UdpMetricsBackend {
    pub(super) fn new(addr: SocketAddr, bind_ip: Option<IpAddr>) -> io::Result<Self> {
        let bind_ip = bind_ip.unwrap_or(match addr {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        });
        let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0))?;
        Ok(UdpMetricsBackend { addr, socket })
    }

    pub(super) fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        self.socket.send_to(msg, self.addr)
    }
}
