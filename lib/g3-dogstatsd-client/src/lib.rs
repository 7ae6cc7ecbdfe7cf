/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod backend;
mod emitter;

mod tag;
pub use tag::DogstatsdTagGroup;

mod stats;
pub use stats::{
    ClientSnapshot, ClientStats, EmitDropSnapshot, EmitDropStats, EmitIoSnapshot, EmitIoStats,
};

mod client;
pub use client::{
    CheckStatus, DogstatsdClient, MetricError, MetricFormatter, ServiceCheckFormatter,
};

mod config;
pub use config::{ClientBuildError, DogstatsdBackend, DogstatsdClientConfig};
