/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[derive(Clone, Default)]
pub struct DogstatsdTagGroup {
    buf: Vec<u8>,
}

impl DogstatsdTagGroup {
    /// Add a `key:value` tag. Within a group the tag added last is
    /// rendered first on the wire.
    pub fn add_tag<T: AsRef<str>>(&mut self, key: &str, value: T) {
        let value = value.as_ref();
        let mut buf = Vec::with_capacity(self.buf.len() + key.len() + value.len() + 2);
        buf.extend_from_slice(key.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(value.as_bytes());
        if !self.buf.is_empty() {
            buf.push(b',');
            buf.extend_from_slice(&self.buf);
        }
        self.buf = buf;
    }

    /// Add a bare token tag. Same rendering order as [`add_tag`].
    ///
    /// [`add_tag`]: Self::add_tag
    pub fn add_tag_value<T: AsRef<str>>(&mut self, value: T) {
        let value = value.as_ref();
        let mut buf = Vec::with_capacity(self.buf.len() + value.len() + 1);
        buf.extend_from_slice(value.as_bytes());
        if !self.buf.is_empty() {
            buf.push(b',');
            buf.extend_from_slice(&self.buf);
        }
        self.buf = buf;
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_order() {
        let mut tags = DogstatsdTagGroup::default();
        tags.add_tag("instance", "foo");
        tags.add_tag("app", "bar");
        assert_eq!(tags.as_bytes(), b"app:bar,instance:foo");
    }

    #[test]
    fn mixed_values() {
        let mut tags = DogstatsdTagGroup::default();
        tags.add_tag("foo", "bar");
        tags.add_tag_value("baz");
        assert_eq!(tags.as_bytes(), b"baz,foo:bar");

        let empty = DogstatsdTagGroup::default();
        assert_eq!(empty.len(), 0);
    }
}
