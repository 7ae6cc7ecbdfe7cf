/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use flume::{Receiver, Sender, TrySendError};
use log::warn;

use crate::ClientStats;
use crate::backend::MetricsBackend;

pub(crate) struct MetricsEmitter {
    sender: Sender<Vec<u8>>,
    stats: Arc<ClientStats>,
    quit: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MetricsEmitter {
    pub(crate) fn spawn(
        backend: MetricsBackend,
        channel_capacity: usize,
        thread_name: &str,
    ) -> io::Result<Self> {
        // a zero capacity channel is rendezvous and can miss the stop sentinel
        let (sender, receiver) = flume::bounded::<Vec<u8>>(channel_capacity.max(1));
        let stats = Arc::new(ClientStats::default());
        let quit = Arc::new(AtomicBool::new(false));

        let io_thread = EmitterThread {
            receiver,
            backend,
            stats: stats.clone(),
            quit: quit.clone(),
            create_instant: Instant::now(),
            last_error_report: 0,
        };
        let handle = std::thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                io_thread.run_to_end();
            })?;

        Ok(MetricsEmitter {
            sender,
            stats,
            quit,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub(crate) fn stats(&self) -> &Arc<ClientStats> {
        &self.stats
    }

    pub(crate) fn emit(&self, msg: Vec<u8>) {
        self.stats.io.add_total();
        match self.sender.try_send(msg) {
            Ok(_) => {}
            Err(TrySendError::Full(_)) => self.stats.drop.add_channel_overflow(),
            Err(TrySendError::Disconnected(_)) => self.stats.drop.add_channel_closed(),
        }
    }

    pub(crate) fn stop(&self) {
        self.quit.store(true, Ordering::Relaxed);
        // wake the io thread if it is parked on an empty channel
        let _ = self.sender.try_send(Vec::new());
        if let Ok(mut handle) = self.handle.lock()
            && let Some(handle) = handle.take()
        {
            let _ = handle.join();
        }
    }
}

struct EmitterThread {
    receiver: Receiver<Vec<u8>>,
    backend: MetricsBackend,
    stats: Arc<ClientStats>,
    quit: Arc<AtomicBool>,
    create_instant: Instant,
    last_error_report: u64,
}

impl EmitterThread {
    fn run_to_end(mut self) {
        while let Ok(msg) = self.receiver.recv() {
            if self.quit.load(Ordering::Relaxed) {
                break;
            }
            match self.backend.send_msg(&msg) {
                Ok(n) => {
                    self.stats.io.add_passed();
                    self.stats.io.add_size(n);
                }
                Err(e) => self.handle_send_error(e),
            }
        }
    }

    fn handle_send_error(&mut self, e: io::Error) {
        self.stats.drop.add_peer_unreachable();
        let time_slice = self.create_instant.elapsed().as_secs().rotate_right(6); // every 64s
        if self.last_error_report != time_slice {
            warn!("sending metrics error: {e:?}");
            self.last_error_report = time_slice;
        }
    }
}
