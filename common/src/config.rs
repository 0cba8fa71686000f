use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Hostname token advertised over mDNS as `<hostname>.local`.
    pub hostname: String,
    #[serde(rename = "httpPort")]
    pub http_port: u16,
    #[serde(rename = "ntpHost")]
    pub ntp_host: String,
    /// Signed offset from UTC to the configured local timezone.
    #[serde(rename = "utcOffsetSecs")]
    pub utc_offset_secs: i64,
    /// Fixed IPv4 to advertise; detected from the routing table when unset.
    #[serde(rename = "advertiseIp", default)]
    pub advertise_ip: Option<[u8; 4]>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hostname: "scenekick".to_string(),
            http_port: 8080,
            ntp_host: "pool.ntp.org".to_string(),
            utc_offset_secs: 9 * 3600,
            advertise_ip: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    #[serde(rename = "apiBase")]
    pub api_base: String,
    #[serde(rename = "apiToken")]
    pub api_token: String,
    #[serde(rename = "requestTimeoutMs")]
    pub request_timeout_ms: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.switch-bot.com".to_string(),
            api_token: String::new(),
            request_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub vendor: VendorConfig,
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        if self.network.hostname.trim().is_empty() {
            self.network.hostname = NetworkConfig::default().hostname;
        }
        self.network.hostname = self.network.hostname.trim().to_ascii_lowercase();

        if self.network.ntp_host.trim().is_empty() {
            self.network.ntp_host = NetworkConfig::default().ntp_host;
        }

        // UTC offsets beyond +/-14h do not exist.
        self.network.utc_offset_secs = self.network.utc_offset_secs.clamp(-14 * 3600, 14 * 3600);

        self.vendor.request_timeout_ms = self.vendor.request_timeout_ms.clamp(500, 30_000);
        while self.vendor.api_base.ends_with('/') {
            self.vendor.api_base.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sanitize_fills_blank_hostname_and_ntp_host() {
        let mut config = RuntimeConfig {
            network: NetworkConfig {
                hostname: "  ".to_string(),
                ntp_host: String::new(),
                ..NetworkConfig::default()
            },
            ..RuntimeConfig::default()
        };
        config.sanitize();

        assert_eq!(config.network.hostname, "scenekick");
        assert_eq!(config.network.ntp_host, "pool.ntp.org");
    }

    #[test]
    fn sanitize_lowercases_hostname_and_clamps_offset() {
        let mut config = RuntimeConfig::default();
        config.network.hostname = " SceneKick ".to_string();
        config.network.utc_offset_secs = 99 * 3600;
        config.sanitize();

        assert_eq!(config.network.hostname, "scenekick");
        assert_eq!(config.network.utc_offset_secs, 14 * 3600);
    }

    #[test]
    fn sanitize_trims_trailing_slash_and_clamps_timeout() {
        let mut config = RuntimeConfig::default();
        config.vendor.api_base = "https://api.example.com//".to_string();
        config.vendor.request_timeout_ms = 1;
        config.sanitize();

        assert_eq!(config.vendor.api_base, "https://api.example.com");
        assert_eq!(config.vendor.request_timeout_ms, 500);
    }
}
