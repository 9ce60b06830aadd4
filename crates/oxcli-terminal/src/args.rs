//! Typed argument slots for command definitions, and parsers for the
//! values they accept.
//!
//! Each constructor returns a grammar node tagged with an id (the name a
//! handler reads the value by) and a help string (shown by completion and
//! used in syntax strings when the id is absent).

use std::net::{Ipv4Addr, Ipv6Addr};

use oxcli_grammar::Node;
use oxcli_types::error::Result;

pub const RE_NAME: &str = "[a-zA-Z][a-zA-Z0-9_-]*";
pub const RE_HOSTNAME: &str = "[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?";
pub const RE_IFNAME: &str = "[a-zA-Z][a-zA-Z0-9_.-]*";
pub const RE_FILENAME: &str = "[^ ]+";
pub const RE_PATH: &str = "[^ ]+";
pub const RE_IPV4: &str = r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}";
pub const RE_IPV4_PREFIX: &str = r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}/[0-9]{1,2}";
pub const RE_IPV6: &str = "[0-9a-fA-F:.]+";
pub const RE_IPV6_PREFIX: &str = "[0-9a-fA-F:.]+/[0-9]{1,3}";
pub const RE_MAC: &str = "[0-9a-fA-F]{1,2}(:[0-9a-fA-F]{1,2}){5}";
pub const RE_MAC_ANY: &str = "[0-9a-fA-F]{1,2}([-:][0-9a-fA-F]{1,2}){5}";
pub const RE_HEX: &str = "(0[xX])?[0-9a-fA-F]+";
pub const RE_DECIMAL: &str = "[0-9]+";

// ---------------------------------------------------------------------------
// Slot constructors
// ---------------------------------------------------------------------------

/// Token matching `pattern`.
pub fn regex(id: &str, pattern: &str, help: &str) -> Result<Node> {
    Ok(Node::pattern(pattern)?.with_id(id).with_help(help))
}

/// Integer within `min..=max`.
pub fn int(id: &str, min: i64, max: i64, help: &str) -> Result<Node> {
    Ok(Node::int(min, max)?.with_id(id).with_help(help))
}

/// Any single token.
pub fn any(id: &str, help: &str) -> Node {
    Node::any().with_id(id).with_help(help)
}

/// One keyword out of `words`; the value is the keyword typed.
pub fn choice(id: &str, words: &[&str], help: &str) -> Node {
    Node::or(words.iter().map(|w| Node::keyword(w)).collect())
        .with_id(id)
        .with_help(help)
}

pub fn name(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_NAME, help)
}

pub fn hostname(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_HOSTNAME, help)
}

pub fn ifname(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_IFNAME, help)
}

pub fn filename(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_FILENAME, help)
}

pub fn path(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_PATH, help)
}

pub fn ipv4(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_IPV4, help)
}

pub fn ipv4_prefix(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_IPV4_PREFIX, help)
}

pub fn ipv6(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_IPV6, help)
}

pub fn ipv6_prefix(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_IPV6_PREFIX, help)
}

/// Colon-separated MAC address.
pub fn mac(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_MAC, help)
}

/// MAC address with colon or dash separators.
pub fn mac_any(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_MAC_ANY, help)
}

pub fn hex(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_HEX, help)
}

pub fn decimal(id: &str, help: &str) -> Result<Node> {
    regex(id, RE_DECIMAL, help)
}

pub fn uint(id: &str, max: i64, help: &str) -> Result<Node> {
    int(id, 0, max, help)
}

/// At least one.
pub fn count(id: &str, max: i64, help: &str) -> Result<Node> {
    int(id, 1, max, help)
}

pub fn port_count(id: &str, help: &str) -> Result<Node> {
    int(id, 1, 256, help)
}

/// TCP/UDP port, 1..=65535.
pub fn port(id: &str, help: &str) -> Result<Node> {
    int(id, 1, 65535, help)
}

/// TCP/UDP port including 0.
pub fn port_any(id: &str, help: &str) -> Result<Node> {
    int(id, 0, 65535, help)
}

/// 802.1Q VLAN id, 1..=4094.
pub fn vlan(id: &str, help: &str) -> Result<Node> {
    int(id, 1, 4094, help)
}

/// VLAN id including the reserved 0 and 4095.
pub fn vlan_any(id: &str, help: &str) -> Result<Node> {
    int(id, 0, 4095, help)
}

/// 802.1p priority, 0..=7.
pub fn priority(id: &str, help: &str) -> Result<Node> {
    int(id, 0, 7, help)
}

pub fn dscp(id: &str, help: &str) -> Result<Node> {
    int(id, 0, 63, help)
}

pub fn mtu(id: &str, help: &str) -> Result<Node> {
    int(id, 64, 65535, help)
}

pub fn percent(id: &str, help: &str) -> Result<Node> {
    int(id, 0, 100, help)
}

pub fn timeout(id: &str, max: i64, help: &str) -> Result<Node> {
    int(id, 1, max, help)
}

pub fn index(id: &str, max: i64, help: &str) -> Result<Node> {
    int(id, 0, max, help)
}

pub fn slot(id: &str, max: i64, help: &str) -> Result<Node> {
    int(id, 1, max, help)
}

pub fn on_off(id: &str, help: &str) -> Node {
    choice(id, &["on", "off"], help)
}

pub fn enable_disable(id: &str, help: &str) -> Node {
    choice(id, &["enable", "disable"], help)
}

pub fn yes_no(id: &str, help: &str) -> Node {
    choice(id, &["yes", "no"], help)
}

pub fn true_false(id: &str, help: &str) -> Node {
    choice(id, &["true", "false"], help)
}

/// Documentation output format: `md`, `rst` or `txt`.
pub fn doc_format(id: &str, help: &str) -> Node {
    choice(id, &["md", "rst", "txt"], help)
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    s.parse().ok()
}

/// `a.b.c.d/len` with `len <= 32`.
pub fn parse_ipv4_prefix(s: &str) -> Option<(Ipv4Addr, u8)> {
    let (addr, len) = s.split_once('/')?;
    let len: u8 = len.parse().ok()?;
    if len > 32 {
        return None;
    }
    Some((parse_ipv4(addr)?, len))
}

pub fn parse_ipv6(s: &str) -> Option<Ipv6Addr> {
    s.parse().ok()
}

/// Six hex octets separated by `:` or `-`.
pub fn parse_mac(s: &str) -> Option<[u8; 6]> {
    let mut mac = [0u8; 6];
    let mut parts = s.split([':', '-']);
    for octet in &mut mac {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 2 {
            return None;
        }
        *octet = u8::from_str_radix(part, 16).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(mac)
}

/// Lowercase colon-separated form.
pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// `on`/`enable`/`yes`/`true`/`1` or `off`/`disable`/`no`/`false`/`0`,
/// case-insensitive.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "enable" | "yes" | "true" | "1" => Some(true),
        "off" | "disable" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxcli_grammar::parse;

    fn accepts(node: Node, token: &str) -> bool {
        let tree = Node::sh_lex(node);
        parse(&tree, token).unwrap().matches()
    }

    #[test]
    fn pattern_slots() {
        assert!(accepts(name("n", "").unwrap(), "eth0_a-b"));
        assert!(!accepts(name("n", "").unwrap(), "0eth"));
        assert!(accepts(hostname("h", "").unwrap(), "edge-router1"));
        assert!(!accepts(hostname("h", "").unwrap(), "-bad"));
        assert!(accepts(ifname("i", "").unwrap(), "eth0.100"));
        assert!(accepts(ipv4("a", "").unwrap(), "10.0.0.1"));
        assert!(!accepts(ipv4("a", "").unwrap(), "10.0.0"));
        assert!(accepts(ipv4_prefix("a", "").unwrap(), "10.0.0.0/24"));
        assert!(accepts(ipv6_prefix("a", "").unwrap(), "2001:db8::/32"));
        assert!(accepts(mac("m", "").unwrap(), "00:1b:2c:3d:4e:5f"));
        assert!(!accepts(mac("m", "").unwrap(), "00-1b-2c-3d-4e-5f"));
        assert!(accepts(mac_any("m", "").unwrap(), "00-1b-2c-3d-4e-5f"));
        assert!(accepts(hex("x", "").unwrap(), "0xFF"));
        assert!(accepts(decimal("d", "").unwrap(), "0042"));
    }

    #[test]
    fn ranged_slots() {
        assert!(accepts(port("p", "").unwrap(), "65535"));
        assert!(!accepts(port("p", "").unwrap(), "0"));
        assert!(accepts(port_any("p", "").unwrap(), "0"));
        assert!(!accepts(vlan("v", "").unwrap(), "4095"));
        assert!(accepts(vlan_any("v", "").unwrap(), "4095"));
        assert!(!accepts(priority("p", "").unwrap(), "8"));
        assert!(!accepts(mtu("m", "").unwrap(), "63"));
        assert!(accepts(percent("p", "").unwrap(), "100"));
        assert!(!accepts(count("c", 10, "").unwrap(), "0"));
    }

    #[test]
    fn choice_value_is_keyword() {
        let tree = Node::sh_lex(Node::seq(vec![
            Node::keyword("shutdown"),
            on_off("state", "on or off"),
        ]));
        let p = parse(&tree, "shutdown off").unwrap();
        assert!(p.matches());
        assert_eq!(p.get_str("state"), Some("off"));
        assert!(!parse(&tree, "shutdown maybe").unwrap().matches());
    }

    #[test]
    fn constructors_tag_id_and_help() {
        let n = port("listen", "port to listen on").unwrap();
        assert_eq!(n.id(), Some("listen"));
        assert_eq!(n.help(), Some("port to listen on"));
        assert!(int("x", 5, 1, "").is_err());
    }

    #[test]
    fn ipv4_parsers() {
        assert_eq!(parse_ipv4("192.168.1.1"), Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(parse_ipv4("300.1.1.1"), None);
        assert_eq!(
            parse_ipv4_prefix("10.0.0.0/8"),
            Some((Ipv4Addr::new(10, 0, 0, 0), 8))
        );
        assert_eq!(parse_ipv4_prefix("10.0.0.0/33"), None);
        assert_eq!(parse_ipv4_prefix("10.0.0.0"), None);
        assert!(parse_ipv6("fe80::1").is_some());
        assert!(parse_ipv6("fe80::zz").is_none());
    }

    #[test]
    fn mac_round_trip() {
        let mac = parse_mac("00:1B:2c:3d:4e:5F").unwrap();
        assert_eq!(format_mac(&mac), "00:1b:2c:3d:4e:5f");
        assert_eq!(parse_mac("0-1b-2c-3d-4e-5f").unwrap()[0], 0);
        assert_eq!(parse_mac("00:1b:2c:3d:4e"), None);
        assert_eq!(parse_mac("00:1b:2c:3d:4e:5f:66"), None);
        assert_eq!(parse_mac("000:1b:2c:3d:4e:5f"), None);
    }

    #[test]
    fn bool_words() {
        assert_eq!(parse_bool("ENABLE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
