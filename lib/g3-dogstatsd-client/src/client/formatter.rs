/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use itoa::Integer;
use smallvec::SmallVec;

use super::{DogstatsdClient, MetricError};
use crate::DogstatsdTagGroup;

const MAX_FRACTION_DIGITS: usize = 6;

enum MetricType {
    Count,
    Gauge,
    Histogram,
    Timer,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Count => "c",
            MetricType::Gauge => "g",
            MetricType::Histogram => "h",
            MetricType::Timer => "ms",
        }
    }
}

pub struct MetricFormatter<'a> {
    client: &'a DogstatsdClient,
    metric_type: MetricType,
    name: &'a str,
    value: SmallVec<[u8; 16]>,
    common_tags: Option<&'a DogstatsdTagGroup>,
    local_tags: DogstatsdTagGroup,
    error: Option<MetricError>,

    has_tags: bool,
}

impl DogstatsdClient {
    pub fn count<'a, T: Integer>(&'a self, name: &'a str, value: T) -> MetricFormatter<'a> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(value);
        self.metric_with_type(
            MetricType::Count,
            name,
            SmallVec::from_slice(value.as_bytes()),
        )
    }

    pub fn count_with_tags<'a, T: Integer>(
        &'a self,
        name: &'a str,
        value: T,
        common_tags: &'a DogstatsdTagGroup,
    ) -> MetricFormatter<'a> {
        self.count(name, value).with_tag_group(common_tags)
    }

    pub fn incr<'a>(&'a self, name: &'a str) -> MetricFormatter<'a> {
        self.count(name, 1i32)
    }

    pub fn decr<'a>(&'a self, name: &'a str) -> MetricFormatter<'a> {
        self.count(name, -1i32)
    }

    pub fn gauge<'a, T: Integer>(&'a self, name: &'a str, value: T) -> MetricFormatter<'a> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(value);
        self.metric_with_type(
            MetricType::Gauge,
            name,
            SmallVec::from_slice(value.as_bytes()),
        )
    }

    pub fn gauge_with_tags<'a, T: Integer>(
        &'a self,
        name: &'a str,
        value: T,
        common_tags: &'a DogstatsdTagGroup,
    ) -> MetricFormatter<'a> {
        self.gauge(name, value).with_tag_group(common_tags)
    }

    pub fn gauge_float<'a>(&'a self, name: &'a str, value: f64) -> MetricFormatter<'a> {
        self.float_metric_with_type(MetricType::Gauge, name, value)
    }

    pub fn gauge_float_with_tags<'a>(
        &'a self,
        name: &'a str,
        value: f64,
        common_tags: &'a DogstatsdTagGroup,
    ) -> MetricFormatter<'a> {
        self.gauge_float(name, value).with_tag_group(common_tags)
    }

    pub fn histogram<'a, T: Integer>(&'a self, name: &'a str, value: T) -> MetricFormatter<'a> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(value);
        self.metric_with_type(
            MetricType::Histogram,
            name,
            SmallVec::from_slice(value.as_bytes()),
        )
    }

    pub fn histogram_with_tags<'a, T: Integer>(
        &'a self,
        name: &'a str,
        value: T,
        common_tags: &'a DogstatsdTagGroup,
    ) -> MetricFormatter<'a> {
        self.histogram(name, value).with_tag_group(common_tags)
    }

    pub fn histogram_float<'a>(&'a self, name: &'a str, value: f64) -> MetricFormatter<'a> {
        self.float_metric_with_type(MetricType::Histogram, name, value)
    }

    pub fn histogram_float_with_tags<'a>(
        &'a self,
        name: &'a str,
        value: f64,
        common_tags: &'a DogstatsdTagGroup,
    ) -> MetricFormatter<'a> {
        self.histogram_float(name, value).with_tag_group(common_tags)
    }

    pub fn time<'a, T: Integer>(&'a self, name: &'a str, millis: T) -> MetricFormatter<'a> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(millis);
        self.metric_with_type(
            MetricType::Timer,
            name,
            SmallVec::from_slice(value.as_bytes()),
        )
    }

    pub fn time_with_tags<'a, T: Integer>(
        &'a self,
        name: &'a str,
        millis: T,
        common_tags: &'a DogstatsdTagGroup,
    ) -> MetricFormatter<'a> {
        self.time(name, millis).with_tag_group(common_tags)
    }

    fn metric_with_type<'a>(
        &'a self,
        metric_type: MetricType,
        name: &'a str,
        value: SmallVec<[u8; 16]>,
    ) -> MetricFormatter<'a> {
        let has_tags = self.tags.len() > 0;
        MetricFormatter {
            client: self,
            metric_type,
            name,
            value,
            common_tags: None,
            local_tags: DogstatsdTagGroup::default(),
            error: if name.is_empty() {
                Some(MetricError::EmptyName)
            } else {
                None
            },
            has_tags,
        }
    }

    fn float_metric_with_type<'a>(
        &'a self,
        metric_type: MetricType,
        name: &'a str,
        value: f64,
    ) -> MetricFormatter<'a> {
        if value.is_finite() {
            self.metric_with_type(metric_type, name, format_f64(value))
        } else {
            let mut formatter = self.metric_with_type(metric_type, name, SmallVec::new());
            if formatter.error.is_none() {
                formatter.error = Some(MetricError::NonFiniteValue);
            }
            formatter
        }
    }
}

impl<'a> MetricFormatter<'a> {
    fn with_tag_group(mut self, tags: &'a DogstatsdTagGroup) -> Self {
        if tags.len() > 0 {
            self.has_tags = true;
            self.common_tags = Some(tags);
        }
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
        let mut len = client.prefix.len() + 1 + self.name.len() + 1 + self.value.len() + 3;
        if self.has_tags {
            len += 2 + client.tags.len() + self.local_tags.len() + 2;
            if let Some(tags) = self.common_tags {
                len += tags.len() + 1;
            }
        }

        let mut buf = Vec::with_capacity(len);
        if !client.prefix.is_empty() {
            buf.extend_from_slice(client.prefix.as_bytes());
            buf.push(b'.');
        }
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(self.value.as_slice());
        buf.push(b'|');
        buf.extend_from_slice(self.metric_type.as_str().as_bytes());

        if self.has_tags {
            buf.extend_from_slice(b"|#");

            let mut append_tags = false;
            if client.tags.len() > 0 {
                buf.extend_from_slice(client.tags.as_bytes());
                append_tags = true;
            }

            if let Some(common_tags) = self.common_tags
                && common_tags.len() > 0
            {
                if append_tags {
                    buf.push(b',');
                }
                buf.extend_from_slice(common_tags.as_bytes());
                append_tags = true;
            }

            if self.local_tags.len() > 0 {
                if append_tags {
                    buf.push(b',');
                }
                buf.extend_from_slice(self.local_tags.as_bytes());
            }
        }
        buf
    }
}

struct ValueBuf(SmallVec<[u8; 16]>);

impl fmt::Write for ValueBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Plain decimal form with a `.` separator and no exponent. The
/// fraction is capped at six digits; whatever the cap cuts off is
/// dropped, not rounded.
fn format_f64(value: f64) -> SmallVec<[u8; 16]> {
    use fmt::Write;

    let mut buf = ValueBuf(SmallVec::new());
    let _ = write!(buf, "{value}");
    let mut value = buf.0;
    if let Some(dot) = value.iter().position(|&c| c == b'.') {
        value.truncate(dot + 1 + MAX_FRACTION_DIGITS);
        while value.last() == Some(&b'0') {
            value.pop();
        }
        if value.last() == Some(&b'.') {
            value.pop();
        }
    }
    value
}
