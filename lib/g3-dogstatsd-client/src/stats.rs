/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct ClientSnapshot {
    pub io: EmitIoSnapshot,
    pub drop: EmitDropSnapshot,
}

#[derive(Default, Debug, Eq, PartialEq)]
pub struct EmitIoSnapshot {
    pub total: u64,
    pub passed: u64,
    pub size: u64,
}

#[derive(Default, Debug, Eq, PartialEq)]
pub struct EmitDropSnapshot {
    pub invalid_input: u64,
    pub channel_closed: u64,
    pub channel_overflow: u64,
    pub peer_unreachable: u64,
}

/// Delivery and drop counters for one client.
///
/// `io.total` counts wire messages handed to the dispatch pipeline,
/// `io.passed` and `io.size` count what actually left the socket.
/// Drop counters tell apart rejected caller input, messages lost to a
/// full or closed channel, and messages the peer never received.
#[derive(Default)]
pub struct ClientStats {
    pub io: EmitIoStats,
    pub drop: EmitDropStats,
}

impl ClientStats {
    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            io: self.io.snapshot(),
            drop: self.drop.snapshot(),
        }
    }
}

#[derive(Default)]
pub struct EmitIoStats {
    total: AtomicU64,
    passed: AtomicU64,
    size: AtomicU64,
}

impl EmitIoStats {
    pub fn snapshot(&self) -> EmitIoSnapshot {
        EmitIoSnapshot {
            total: self.total.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            size: self.size.load(Ordering::Relaxed),
        }
    }

    pub fn add_total(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_passed(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_size(&self, size: usize) {
        self.size.fetch_add(size as u64, Ordering::Relaxed);
    }
}

#[derive(Default)]
pub struct EmitDropStats {
    invalid_input: AtomicU64,
    channel_closed: AtomicU64,
    channel_overflow: AtomicU64,
    peer_unreachable: AtomicU64,
}

impl EmitDropStats {
    pub fn snapshot(&self) -> EmitDropSnapshot {
        EmitDropSnapshot {
            invalid_input: self.invalid_input.load(Ordering::Relaxed),
            channel_closed: self.channel_closed.load(Ordering::Relaxed),
            channel_overflow: self.channel_overflow.load(Ordering::Relaxed),
            peer_unreachable: self.peer_unreachable.load(Ordering::Relaxed),
        }
    }

    pub fn add_invalid_input(&self) {
        self.invalid_input.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_channel_closed(&self) {
        self.channel_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_channel_overflow(&self) {
        self.channel_overflow.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_peer_unreachable(&self) {
        self.peer_unreachable.fetch_add(1, Ordering::Relaxed);
    }
}
