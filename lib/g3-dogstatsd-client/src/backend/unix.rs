/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;

pub(super) struct UnixMetricsBackend {
    path: PathBuf,
    socket: UnixDatagram,
}

impl UnixMetricsBackend {
    pub(super) fn new(path: PathBuf) -> io::Result<Self> {
        let socket = UnixDatagram::unbound()?;
        // a backed up peer queue must fail the send, not block the io thread
        socket.set_nonblocking(true)?;
        Ok(UnixMetricsBackend { path, socket })
    }

    pub(super) fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        self.socket.send_to(msg, &self.path)
    }
}
