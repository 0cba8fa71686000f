use std::{
    sync::atomic::{AtomicBool, AtomicI64, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use tokio::net::UdpSocket;
use tracing::{info, warn};

use scenekick_common::{clock::decompose, ntp, NetworkConfig, TimeParts};

const NTP_TIMEOUT: Duration = Duration::from_secs(1);

/// Delay between startup resync attempts until the first success.
const STARTUP_RETRY: Duration = Duration::from_secs(2);

/// Offset-corrected wall clock. The system clock stands in for the hardware
/// RTC; a resync stores the network-minus-system correction instead of
/// rewriting it. `now()` never fails and never goes below zero.
pub struct Clock {
    ntp_host: String,
    utc_offset_secs: i64,
    correction_secs: AtomicI64,
    synced: AtomicBool,
}

impl Clock {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            ntp_host: network.ntp_host.clone(),
            utc_offset_secs: network.utc_offset_secs,
            correction_secs: AtomicI64::new(0),
            synced: AtomicBool::new(false),
        }
    }

    fn system_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0)
    }

    pub fn now(&self) -> i64 {
        let corrected = Self::system_now()
            + self.correction_secs.load(Ordering::Relaxed)
            + self.utc_offset_secs;
        corrected.max(0)
    }

    pub fn now_parts(&self) -> TimeParts {
        decompose(self.now())
    }

    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Relaxed)
    }

    /// One NTP query with a short timeout. On success the correction offset
    /// is replaced and the corrected current time returned; on any failure
    /// the clock is left untouched.
    pub async fn resync(&self) -> anyhow::Result<i64> {
        self.resync_with(self.ntp_host.as_str(), ntp::NTP_PORT).await
    }

    async fn resync_with(&self, host: &str, port: u16) -> anyhow::Result<i64> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket
            .connect((host, port))
            .await
            .with_context(|| format!("resolving NTP host {host}"))?;
        socket.send(&ntp::client_packet()).await?;

        let mut reply = [0u8; ntp::PACKET_LEN];
        let len = tokio::time::timeout(NTP_TIMEOUT, socket.recv(&mut reply))
            .await
            .map_err(|_| anyhow::anyhow!("no response from NTP server {host}"))??;

        let network_now = ntp::unix_time_from_reply(&reply[..len])?;
        self.correction_secs
            .store(network_now - Self::system_now(), Ordering::Relaxed);
        self.synced.store(true, Ordering::Relaxed);
        Ok(self.now())
    }

    /// Startup gate: the device is not time-valid until one resync succeeds.
    pub async fn sync_until_valid(&self) -> i64 {
        loop {
            match self.resync().await {
                Ok(now) => {
                    info!("clock corrected from {}", self.ntp_host);
                    return now;
                }
                Err(err) => {
                    warn!("startup clock sync failed, retrying: {err:#}");
                    tokio::time::sleep(STARTUP_RETRY).await;
                }
            }
        }
    }

    pub fn note_resync_failure(&self) {
        self.synced.store(false, Ordering::Relaxed);
    }
}
