/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::{DogstatsdClient, MetricError};
use crate::DogstatsdTagGroup;

/// Status value carried by a service check line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl CheckStatus {
    fn as_u8(&self) -> u8 {
        match self {
            CheckStatus::Ok => 0,
            CheckStatus::Warning => 1,
            CheckStatus::Critical => 2,
            CheckStatus::Unknown => 3,
        }
    }
}

pub struct ServiceCheckFormatter<'a> {
    client: &'a DogstatsdClient,
    name: &'a str,
    status: CheckStatus,
    timestamp: Option<u64>,
    hostname: Option<&'a str>,
    message: Option<&'a str>,
    local_tags: DogstatsdTagGroup,
    error: Option<MetricError>,

    has_tags: bool,
}

impl DogstatsdClient {
    /// Start a service check line. The check name goes out as is, the
    /// client prefix is not applied.
    pub fn service_check<'a>(
        &'a self,
        name: &'a str,
        status: CheckStatus,
    ) -> ServiceCheckFormatter<'a> {
        ServiceCheckFormatter {
            client: self,
            name,
            status,
            timestamp: None,
            hostname: None,
            message: None,
            local_tags: DogstatsdTagGroup::default(),
            error: if name.is_empty() {
                Some(MetricError::EmptyName)
            } else {
                None
            },
            has_tags: self.tags.len() > 0,
        }
    }
}

impl<'a> ServiceCheckFormatter<'a> {
    pub fn with_timestamp(mut self, epoch_seconds: u64) -> Self {
        self.timestamp = Some(epoch_seconds);
        self
    }

    pub fn with_hostname(mut self, hostname: &'a str) -> Self {
        self.hostname = Some(hostname);
        self
    }

    /// Attach a free form message. `|` and newline bytes get escaped
    /// when the line is built.
    pub fn with_message(mut self, message: &'a str) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_tag<T: AsRef<str>>(mut self, key: &str, value: T) -> Self {
        // set has_tags later when send
        self.local_tags.add_tag(key, value);
        self
    }

    pub fn with_tag_value<T: AsRef<str>>(mut self, value: T) -> Self {
        // set has_tags later when send
        self.local_tags.add_tag_value(value);
        self
    }

    pub fn try_send(mut self) -> Result<(), MetricError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.local_tags.len() > 0 {
            self.has_tags = true;
        }
        let msg = self.format();
        self.client.emit(msg);
        Ok(())
    }

    pub fn send(self) {
        let client = self.client;
        if self.try_send().is_err() {
            client.handle_invalid_input();
        }
    }

    fn format(&self) -> Vec<u8> {
        let client = self.client;
        let mut len = 4 + self.name.len() + 2;
        if self.timestamp.is_some() {
            len += 3 + 20;
        }
        if let Some(hostname) = self.hostname {
            len += 3 + hostname.len();
        }
        if self.has_tags {
            len += 2 + client.tags.len() + self.local_tags.len() + 1;
        }
        if let Some(message) = self.message {
            len += 3 + message.len();
        }

        let mut buf = Vec::with_capacity(len);
        buf.extend_from_slice(b"_sc|");
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(b'|');
        buf.push(b'0' + self.status.as_u8());

        if let Some(timestamp) = self.timestamp {
            buf.extend_from_slice(b"|d:");
            let mut buffer = itoa::Buffer::new();
            buf.extend_from_slice(buffer.format(timestamp).as_bytes());
        }

        if let Some(hostname) = self.hostname {
            buf.extend_from_slice(b"|h:");
            buf.extend_from_slice(hostname.as_bytes());
        }

        if self.has_tags {
            buf.extend_from_slice(b"|#");

            let mut append_tags = false;
            if client.tags.len() > 0 {
                buf.extend_from_slice(client.tags.as_bytes());
                append_tags = true;
            }

            if self.local_tags.len() > 0 {
                if append_tags {
                    buf.push(b',');
                }
                buf.extend_from_slice(self.local_tags.as_bytes());
            }
        }

        if let Some(message) = self.message {
            buf.extend_from_slice(b"|m:");
            push_escaped_message(&mut buf, message);
        }
        buf
    }
}

fn push_escaped_message(buf: &mut Vec<u8>, message: &str) {
    for c in message.bytes() {
        match c {
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'|' => buf.extend_from_slice(b"\\:"),
            _ => buf.push(c),
        }
    }
}
