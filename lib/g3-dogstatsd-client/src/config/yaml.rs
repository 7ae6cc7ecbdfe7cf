/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
#[cfg(unix)]
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use log::warn;
use yaml_rust::{Yaml, yaml};

use super::{DogstatsdBackend, DogstatsdClientConfig};

impl DogstatsdBackend {
    pub fn parse_udp_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::Hash(map) => {
                let mut addr: Option<SocketAddr> = None;
                let mut bind: Option<IpAddr> = None;

                foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                    "address" | "addr" => {
                        addr = Some(as_sockaddr(v).context(format!(
                            "invalid dogstatsd udp peer socket address value for key {k}"
                        ))?);
                        Ok(())
                    }
                    "bind_ip" | "bind" => {
                        bind = Some(as_ipaddr(v).context(format!("invalid value for key {k}"))?);
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;

                if let Some(addr) = addr.take() {
                    Ok(DogstatsdBackend::Udp(addr, bind))
                } else {
                    Err(anyhow!("no target address has been set"))
                }
            }
            Yaml::String(s) => {
                let addr =
                    SocketAddr::from_str(s).map_err(|e| anyhow!("invalid SocketAddr: {e}"))?;
                Ok(DogstatsdBackend::Udp(addr, None))
            }
            _ => Err(anyhow!("invalid yaml value for udp dogstatsd backend")),
        }
    }

    #[cfg(unix)]
    pub fn parse_unix_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::Hash(map) => {
                let mut path: Option<PathBuf> = None;

                foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                    "path" => {
                        path = Some(
                            as_absolute_path(v).context(format!("invalid value for key {k}"))?,
                        );
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;
                if let Some(path) = path.take() {
                    Ok(DogstatsdBackend::Unix(path))
                } else {
                    Err(anyhow!("no path has been set"))
                }
            }
            Yaml::String(_) => {
                let path = as_absolute_path(v)?;
                Ok(DogstatsdBackend::Unix(path))
            }
            _ => Err(anyhow!("invalid yaml value for unix dogstatsd backend")),
        }
    }
}

impl DogstatsdClientConfig {
    pub fn parse_yaml(v: &Yaml, prefix: String) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = DogstatsdClientConfig::with_prefix(prefix);
            foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
            Ok(config)
        } else {
            Err(anyhow!(
                "yaml value type for 'dogstatsd client config' should be 'map'"
            ))
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "target_udp" | "backend_udp" => {
                let target = DogstatsdBackend::parse_udp_yaml(v)
                    .context(format!("invalid value for key {k}"))?;
                self.set_backend(target);
            }
            #[cfg(unix)]
            "target_unix" | "backend_unix" => {
                let target = DogstatsdBackend::parse_unix_yaml(v)
                    .context(format!("invalid value for key {k}"))?;
                self.set_backend(target);
            }
            "target" | "backend" => {
                return if let Yaml::Hash(map) = v {
                    foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                        "udp" => {
                            let target = DogstatsdBackend::parse_udp_yaml(v)
                                .context(format!("invalid value for key {k}"))?;
                            self.set_backend(target);
                            Ok(())
                        }
                        #[cfg(unix)]
                        "unix" => {
                            let target = DogstatsdBackend::parse_unix_yaml(v)
                                .context(format!("invalid value for key {k}"))?;
                            self.set_backend(target);
                            Ok(())
                        }
                        _ => Err(anyhow!("invalid key {k}")),
                    })
                    .context(format!("invalid value for key {k}"))
                } else {
                    Err(anyhow!("yaml value type for key {k} should be 'map'"))
                };
            }
            "prefix" => {
                if let Yaml::String(s) = v {
                    self.set_prefix(s.to_string());
                } else {
                    return Err(anyhow!("yaml value type for key {k} should be 'string'"));
                }
            }
            "channel_capacity" => {
                let capacity = as_usize(v).context(format!("invalid usize value for key {k}"))?;
                self.set_channel_capacity(capacity);
            }
            "queue_size" => {
                warn!("deprecated config key '{k}', please use 'channel_capacity' instead");
                return self.set_by_yaml_kv("channel_capacity", v);
            }
            "thread_name" => {
                if let Yaml::String(s) = v {
                    self.set_thread_name(s.to_string());
                } else {
                    return Err(anyhow!("yaml value type for key {k} should be 'string'"));
                }
            }
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    if let Yaml::String(s) = v {
        SocketAddr::from_str(s).map_err(|e| anyhow!("invalid SocketAddr: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'SocketAddr' should be 'string'"))
    }
}

fn as_ipaddr(v: &Yaml) -> anyhow::Result<IpAddr> {
    if let Yaml::String(s) = v {
        IpAddr::from_str(s).map_err(|e| anyhow!("invalid IpAddr: {e}"))
    } else {
        Err(anyhow!("yaml value type for 'IpAddr' should be 'string'"))
    }
}

fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

#[cfg(unix)]
fn as_absolute_path(v: &Yaml) -> anyhow::Result<PathBuf> {
    if let Yaml::String(path) = v {
        let path = PathBuf::from_str(path).map_err(|e| anyhow!("invalid path: {e:?}"))?;
        if path.is_relative() {
            return Err(anyhow!(
                "invalid value: {} is not an absolute path",
                path.display()
            ));
        }
        Ok(path)
    } else {
        Err(anyhow!("yaml value type for path should be string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use yaml_rust::YamlLoader;

    macro_rules! yaml_doc {
        ($yaml:literal) => {
            YamlLoader::load_from_str($yaml).unwrap().pop().unwrap()
        };
    }

    fn default_prefix() -> String {
        "test".to_string()
    }

    #[test]
    fn parse_udp_yaml_err() {
        let yaml = yaml_doc!(
            r#"
                invalid_key: "value"
            "#
        );
        assert!(DogstatsdBackend::parse_udp_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                address: "invalid-addr"
            "#
        );
        assert!(DogstatsdBackend::parse_udp_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                address: "127.0.0.1:8125"
                bind_ip: "invalid-ip"
            "#
        );
        assert!(DogstatsdBackend::parse_udp_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                bind_ip: "127.0.0.1"
            "#
        );
        assert!(DogstatsdBackend::parse_udp_yaml(&yaml).is_err());

        let yaml = Yaml::Array(vec![]);
        assert!(DogstatsdBackend::parse_udp_yaml(&yaml).is_err());

        let yaml = Yaml::Integer(123);
        assert!(DogstatsdBackend::parse_udp_yaml(&yaml).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn parse_unix_yaml_err() {
        let yaml = yaml_doc!(
            r#"
                invalid_key: "value"
            "#
        );
        assert!(DogstatsdBackend::parse_unix_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                path: "relative/path"
            "#
        );
        assert!(DogstatsdBackend::parse_unix_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                path:
            "#
        );
        assert!(DogstatsdBackend::parse_unix_yaml(&yaml).is_err());

        let yaml = Yaml::Boolean(true);
        assert!(DogstatsdBackend::parse_unix_yaml(&yaml).is_err());

        let yaml = Yaml::Null;
        assert!(DogstatsdBackend::parse_unix_yaml(&yaml).is_err());
    }

    #[test]
    fn parse_yaml_ok() {
        let yaml = yaml_doc!(
            r#"
                target_udp: "127.0.0.1:8125"
                prefix: "myapp"
                channel_capacity: 512
            "#
        );
        let config = DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
        match config.backend {
            DogstatsdBackend::Udp(addr, bind) => {
                assert_eq!(addr, SocketAddr::from_str("127.0.0.1:8125").unwrap());
                assert_eq!(bind, None);
            }
            #[cfg(unix)]
            _ => panic!("expected UDP backend"),
        }
        assert_eq!(config.prefix, "myapp");
        assert_eq!(config.channel_capacity, 512);
        assert_eq!(config.thread_name, "statsd-emit");

        let yaml = yaml_doc!(
            r#"
                backend_udp:
                  address: "192.168.1.1:9125"
                  bind_ip: "127.0.0.1"
                prefix: "test.prefix"
                queue_size: 1024
            "#
        );
        let config = DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
        match config.backend {
            DogstatsdBackend::Udp(addr, bind) => {
                assert_eq!(addr, SocketAddr::from_str("192.168.1.1:9125").unwrap());
                assert_eq!(
                    bind,
                    Some(IpAddr::V4(Ipv4Addr::from_str("127.0.0.1").unwrap()))
                );
            }
            #[cfg(unix)]
            _ => panic!("expected UDP backend"),
        }
        assert_eq!(config.prefix, "test.prefix");
        assert_eq!(config.channel_capacity, 1024);

        let yaml = yaml_doc!(
            r#"
                target:
                  udp:
                    addr: "10.0.0.1:8126"
                    bind: "0.0.0.0"
                prefix: "nested.udp"
                thread_name: "metrics"
            "#
        );
        let config = DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
        match config.backend {
            DogstatsdBackend::Udp(addr, bind) => {
                assert_eq!(addr, SocketAddr::from_str("10.0.0.1:8126").unwrap());
                assert_eq!(bind, Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
            }
            #[cfg(unix)]
            _ => panic!("expected UDP backend"),
        }
        assert_eq!(config.prefix, "nested.udp");
        assert_eq!(config.thread_name, "metrics");

        #[cfg(unix)]
        {
            let yaml = yaml_doc!(
                r#"
                    target_unix: "/tmp/statsd.sock"
                    prefix: "unix.app"
                "#
            );
            let config = DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
            match config.backend {
                DogstatsdBackend::Unix(path) => {
                    assert_eq!(path, PathBuf::from("/tmp/statsd.sock"));
                }
                _ => panic!("expected Unix backend"),
            }
            assert_eq!(config.prefix, "unix.app");

            let yaml = yaml_doc!(
                r#"
                    backend_unix:
                      path: "/var/run/statsd.sock"
                    channel_capacity: 2048
                "#
            );
            let config = DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
            match config.backend {
                DogstatsdBackend::Unix(path) => {
                    assert_eq!(path, PathBuf::from("/var/run/statsd.sock"));
                }
                _ => panic!("expected Unix backend"),
            }
            assert_eq!(config.channel_capacity, 2048);

            let yaml = yaml_doc!(
                r#"
                    backend:
                      unix:
                        path: "/tmp/nested.sock"
                    prefix: "nested.unix"
                "#
            );
            let config = DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).unwrap();
            match config.backend {
                DogstatsdBackend::Unix(path) => {
                    assert_eq!(path, PathBuf::from("/tmp/nested.sock"));
                }
                _ => panic!("expected Unix backend"),
            }
            assert_eq!(config.prefix, "nested.unix");
        }
    }

    #[test]
    fn parse_yaml_err() {
        let yaml = yaml_doc!(
            r#"
                invalid_key: "value"
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                target_udp: "invalid-address"
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                backend_udp: false
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        #[cfg(unix)]
        {
            let yaml = yaml_doc!(
                r#"
                    target_unix: "relative/path"
                "#
            );
            assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

            let yaml = yaml_doc!(
                r#"
                    backend_unix: 123
                "#
            );
            assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());
        }

        let yaml = yaml_doc!(
            r#"
                target: "not_a_map"
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                backend:
                  invalid_backend: "value"
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                prefix: 123
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                channel_capacity: -1
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                queue_size: "abc"
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = yaml_doc!(
            r#"
                thread_name: 123
            "#
        );
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = Yaml::Array(vec![]);
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = Yaml::Integer(123);
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = Yaml::Boolean(true);
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = Yaml::Real("1.23".to_string());
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());

        let yaml = Yaml::Null;
        assert!(DogstatsdClientConfig::parse_yaml(&yaml, default_prefix()).is_err());
    }
}
