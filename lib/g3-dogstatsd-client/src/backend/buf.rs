/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::{Arc, Mutex};

pub(super) struct BufMetricsBackend {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufMetricsBackend {
    pub(super) fn new(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        BufMetricsBackend { buf }
    }

    pub(super) fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap();
        buf.extend_from_slice(msg);
        Ok(msg.len())
    }
}
