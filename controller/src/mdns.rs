use std::net::{IpAddr, Ipv4Addr};

use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{info, warn};

use scenekick_common::{
    mdns::{self, MDNS_GROUP, MDNS_PORT, RESPONSE_REPEATS},
    ntp,
};

use crate::state::AppState;

pub fn spawn(state: AppState) {
    tokio::spawn(run(state));
}

/// Presence responder: answers multicast queries naming this device so the
/// configuration interface can be reached as `<hostname>.local`. Fully
/// independent of the worker; a bind failure only degrades discovery.
async fn run(state: AppState) {
    let hostname = state.config.network.hostname.clone();
    let address = advertised_ipv4(&state).await;

    let socket = match bind_multicast().await {
        Ok(socket) => socket,
        Err(err) => {
            warn!("mDNS bind failed, presence advertisement disabled: {err:#}");
            state.journal_record("Presence responder disabled.").await;
            return;
        }
    };

    info!("presence responder answering for {hostname}.local with {address}");
    let mut buf = [0u8; 512];
    loop {
        let received = match socket.recv_from(&mut buf).await {
            Ok((len, _)) => &buf[..len],
            Err(err) => {
                warn!("mDNS receive error: {err}");
                continue;
            }
        };

        if let Some(answer) = mdns::handle_query(received, &hostname, address) {
            transmit_answer(&socket, &answer, (MDNS_GROUP, MDNS_PORT)).await;
        }
    }
}

/// Redundant triplicate send; multicast delivery is lossy and there is no
/// retry beyond this.
async fn transmit_answer<A: ToSocketAddrs + Copy>(
    socket: &UdpSocket,
    answer: &[u8],
    target: A,
) -> usize {
    let mut sent = 0;
    for _ in 0..RESPONSE_REPEATS {
        match socket.send_to(answer, target).await {
            Ok(_) => sent += 1,
            Err(err) => {
                warn!("mDNS send failed: {err}");
                break;
            }
        }
    }
    sent
}

async fn bind_multicast() -> anyhow::Result<UdpSocket> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, MDNS_PORT)).await?;
    socket.join_multicast_v4(MDNS_GROUP, Ipv4Addr::UNSPECIFIED)?;
    Ok(socket)
}

async fn advertised_ipv4(state: &AppState) -> Ipv4Addr {
    if let Some(octets) = state.config.network.advertise_ip {
        return Ipv4Addr::from(octets);
    }
    match detect_ipv4(&state.config.network.ntp_host).await {
        Some(address) => address,
        None => {
            warn!("could not determine local IPv4, advertising 0.0.0.0");
            Ipv4Addr::UNSPECIFIED
        }
    }
}

/// Routing-table probe: connecting a UDP socket selects the local address a
/// datagram to this destination would use. Nothing is transmitted.
async fn detect_ipv4(host: &str) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect((host, ntp::NTP_PORT)).await.ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(address) => Some(address),
        IpAddr::V6(_) => None,
    }
}
