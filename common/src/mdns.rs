use std::net::Ipv4Addr;

pub const MDNS_PORT: u16 = 5353;
pub const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// Answer record TTL advertised to resolvers.
pub const ANSWER_TTL_SECS: u32 = 300;

/// Each answer is transmitted this many times to compensate for lossy
/// multicast delivery.
pub const RESPONSE_REPEATS: usize = 3;

/// Header flags: response + authoritative answer.
const FLAGS_AUTHORITATIVE_RESPONSE: u16 = 0x8400;

const TYPE_A: u16 = 0x0001;
const CLASS_IN: u16 = 0x0001;

/// Raw-bytes substring check for the hostname token. Queries are never parsed
/// as DNS; anything not mentioning the token is ignored.
pub fn query_mentions_host(query: &[u8], hostname: &str) -> bool {
    let token = hostname.as_bytes();
    !token.is_empty() && query.len() >= token.len() && query.windows(token.len()).any(|w| w == token)
}

/// Fixed-shape answer packet: transaction id zero, one A record for
/// `<hostname>.local` carrying the device's IPv4 address.
pub fn build_answer(hostname: &str, addr: Ipv4Addr) -> Vec<u8> {
    let mut packet = Vec::with_capacity(12 + hostname.len() + 7 + 14);

    packet.extend_from_slice(&0u16.to_be_bytes()); // transaction id
    packet.extend_from_slice(&FLAGS_AUTHORITATIVE_RESPONSE.to_be_bytes());
    packet.extend_from_slice(&0u16.to_be_bytes()); // questions
    packet.extend_from_slice(&1u16.to_be_bytes()); // answers
    packet.extend_from_slice(&0u16.to_be_bytes()); // authority
    packet.extend_from_slice(&0u16.to_be_bytes()); // additional

    packet.push(hostname.len() as u8);
    packet.extend_from_slice(hostname.as_bytes());
    packet.push(5);
    packet.extend_from_slice(b"local");
    packet.push(0);

    packet.extend_from_slice(&TYPE_A.to_be_bytes());
    packet.extend_from_slice(&CLASS_IN.to_be_bytes());
    packet.extend_from_slice(&ANSWER_TTL_SECS.to_be_bytes());
    packet.extend_from_slice(&4u16.to_be_bytes());
    packet.extend_from_slice(&addr.octets());

    packet
}

/// Decide whether a received datagram deserves an answer, and build it.
pub fn handle_query(query: &[u8], hostname: &str, addr: Ipv4Addr) -> Option<Vec<u8>> {
    query_mentions_host(query, hostname).then(|| build_answer(hostname, addr))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const HOST: &str = "scenekick";
    const ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);

    fn query_for(name: &str) -> Vec<u8> {
        // Minimal question-shaped datagram; the responder only does a
        // substring check, so header bytes are arbitrary.
        let mut query = vec![0x12, 0x34, 0x00, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0];
        query.push(name.len() as u8);
        query.extend_from_slice(name.as_bytes());
        query.push(5);
        query.extend_from_slice(b"local");
        query.push(0);
        query.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        query
    }

    #[test]
    fn answers_queries_naming_this_host() {
        assert!(handle_query(&query_for(HOST), HOST, ADDR).is_some());
    }

    #[test]
    fn ignores_unrelated_queries() {
        assert!(handle_query(&query_for("printer"), HOST, ADDR).is_none());
        assert!(handle_query(&[], HOST, ADDR).is_none());
        assert!(handle_query(&[0xFF; 4], HOST, ADDR).is_none());
    }

    #[test]
    fn empty_hostname_never_matches() {
        assert!(!query_mentions_host(&query_for(HOST), ""));
    }

    #[test]
    fn answer_header_is_fixed_shape() {
        let answer = build_answer(HOST, ADDR);

        assert_eq!(&answer[0..2], &[0x00, 0x00]); // transaction id
        assert_eq!(&answer[2..4], &[0x84, 0x00]); // authoritative response
        assert_eq!(&answer[4..6], &[0x00, 0x00]); // qdcount
        assert_eq!(&answer[6..8], &[0x00, 0x01]); // ancount
        assert_eq!(&answer[8..12], &[0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn answer_carries_host_dot_local_a_record() {
        let answer = build_answer(HOST, ADDR);
        let mut offset = 12;

        assert_eq!(answer[offset] as usize, HOST.len());
        offset += 1;
        assert_eq!(&answer[offset..offset + HOST.len()], HOST.as_bytes());
        offset += HOST.len();
        assert_eq!(answer[offset], 5);
        offset += 1;
        assert_eq!(&answer[offset..offset + 5], b"local");
        offset += 5;
        assert_eq!(answer[offset], 0);
        offset += 1;

        assert_eq!(&answer[offset..offset + 2], &[0x00, 0x01]); // type A
        assert_eq!(&answer[offset + 2..offset + 4], &[0x00, 0x01]); // class IN
        assert_eq!(
            &answer[offset + 4..offset + 8],
            &ANSWER_TTL_SECS.to_be_bytes()
        );
        assert_eq!(&answer[offset + 8..offset + 10], &[0x00, 0x04]);
        assert_eq!(&answer[offset + 10..offset + 14], &ADDR.octets());
        assert_eq!(answer.len(), offset + 14);
    }
}
