use thiserror::Error;

pub const NTP_PORT: u16 = 123;
pub const PACKET_LEN: usize = 48;

/// Seconds between the NTP era (1900-01-01) and the Unix epoch.
const NTP_UNIX_ERA_OFFSET: u64 = 2_208_988_800;

/// Byte offset of the transmit-timestamp seconds field in a server reply.
const TRANSMIT_SECONDS_OFFSET: usize = 40;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NtpError {
    #[error("short reply ({0} bytes)")]
    ShortReply(usize),
    #[error("zero transmit timestamp")]
    ZeroTimestamp,
    #[error("transmit timestamp predates the unix epoch")]
    PreUnixEra,
}

/// Mode-3 (client) query packet: LI=0, VN=3, Mode=3, all timestamps zero.
pub fn client_packet() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = 0x1B;
    packet
}

/// Extract the server's transmit timestamp from a reply and convert it to
/// Unix epoch seconds.
pub fn unix_time_from_reply(reply: &[u8]) -> Result<i64, NtpError> {
    if reply.len() < PACKET_LEN {
        return Err(NtpError::ShortReply(reply.len()));
    }

    let raw = u32::from_be_bytes([
        reply[TRANSMIT_SECONDS_OFFSET],
        reply[TRANSMIT_SECONDS_OFFSET + 1],
        reply[TRANSMIT_SECONDS_OFFSET + 2],
        reply[TRANSMIT_SECONDS_OFFSET + 3],
    ]) as u64;

    if raw == 0 {
        return Err(NtpError::ZeroTimestamp);
    }
    if raw < NTP_UNIX_ERA_OFFSET {
        return Err(NtpError::PreUnixEra);
    }

    Ok((raw - NTP_UNIX_ERA_OFFSET) as i64)
}
