//! Capability vocabulary <-> protocol bitmask tables
//!
//! CDP and LLDP assign different bit positions to the same roles, so each
//! direction of each protocol has its own explicit table.

use linkscope_core::Capability;
use std::collections::BTreeSet;

/// CDP bit -> capability. Both bridge flavours collapse to `Bridge`; IGMP (0x20) is dropped.
pub static CDP_DECODE_TABLE: [(u32, Capability); 7] = [
    (0x01, Capability::Router),
    (0x02, Capability::Bridge),
    (0x04, Capability::Bridge),
    (0x08, Capability::Switch),
    (0x10, Capability::Station),
    (0x40, Capability::Repeater),
    (0x80, Capability::Phone),
];

/// Capability -> CDP bit. `AccessPoint` and `Other` have no CDP bit.
pub static CDP_ENCODE_TABLE: [(Capability, u32); 6] = [
    (Capability::Router, 0x01),
    (Capability::Bridge, 0x02),
    (Capability::Switch, 0x08),
    (Capability::Station, 0x10),
    (Capability::Repeater, 0x40),
    (Capability::Phone, 0x80),
];

/// LLDP bit -> capability. DOCSIS (0x40) is reported as `Other`.
pub static LLDP_DECODE_TABLE: [(u16, Capability); 8] = [
    (0x0001, Capability::Other),
    (0x0002, Capability::Repeater),
    (0x0004, Capability::Bridge),
    (0x0008, Capability::AccessPoint),
    (0x0010, Capability::Router),
    (0x0020, Capability::Phone),
    (0x0040, Capability::Other),
    (0x0080, Capability::Station),
];

/// Capability -> LLDP bit. LLDP has no switch bit, a switch advertises as a bridge.
pub static LLDP_ENCODE_TABLE: [(Capability, u16); 8] = [
    (Capability::Other, 0x0001),
    (Capability::Repeater, 0x0002),
    (Capability::Bridge, 0x0004),
    (Capability::Switch, 0x0004),
    (Capability::AccessPoint, 0x0008),
    (Capability::Router, 0x0010),
    (Capability::Phone, 0x0020),
    (Capability::Station, 0x0080),
];

/// CDP bit for a lone station
pub const CDP_STATION: u32 = 0x10;

/// LLDP bit for a lone station
pub const LLDP_STATION: u16 = 0x0080;

pub fn cdp_bits_to_capabilities(bits: u32) -> BTreeSet<Capability> {
    CDP_DECODE_TABLE
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, cap)| *cap)
        .collect()
}

/// Encode capabilities as a CDP mask, defaulting to Station when nothing maps
pub fn cdp_capabilities_to_bits<'a, I>(caps: I) -> u32
where
    I: IntoIterator<Item = &'a Capability>,
{
    let bits = caps
        .into_iter()
        .filter_map(|cap| CDP_ENCODE_TABLE.iter().find(|(c, _)| c == cap))
        .fold(0, |acc, (_, bit)| acc | *bit);

    if bits == 0 {
        CDP_STATION
    } else {
        bits
    }
}

pub fn lldp_bits_to_capabilities(bits: u16) -> BTreeSet<Capability> {
    LLDP_DECODE_TABLE
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, cap)| *cap)
        .collect()
}

/// Encode capabilities as an LLDP mask, defaulting to Station when nothing maps
pub fn lldp_capabilities_to_bits<'a, I>(caps: I) -> u16
where
    I: IntoIterator<Item = &'a Capability>,
{
    let bits = caps
        .into_iter()
        .filter_map(|cap| LLDP_ENCODE_TABLE.iter().find(|(c, _)| c == cap))
        .fold(0, |acc, (_, bit)| acc | *bit);

    if bits == 0 {
        LLDP_STATION
    } else {
        bits
    }
}

/// Parse configured capability names, skipping unknown ones
pub fn parse_capability_names<S: AsRef<str>>(names: &[S]) -> BTreeSet<Capability> {
    names
        .iter()
        .filter_map(|name| Capability::from_name(name.as_ref()))
        .collect()
}

pub fn cdp_bits_from_names<S: AsRef<str>>(names: &[S]) -> u32 {
    cdp_capabilities_to_bits(&parse_capability_names(names))
}

pub fn lldp_bits_from_names<S: AsRef<str>>(names: &[S]) -> u16 {
    lldp_capabilities_to_bits(&parse_capability_names(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every subset of the vocabulary
    fn all_subsets() -> Vec<BTreeSet<Capability>> {
        (0u32..(1 << Capability::ALL.len()))
            .map(|mask| {
                Capability::ALL
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, cap)| *cap)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_cdp_decode_bits() {
        let caps = cdp_bits_to_capabilities(0x08);
        assert_eq!(caps.into_iter().collect::<Vec<_>>(), vec![Capability::Switch]);

        let caps = cdp_bits_to_capabilities(0x02 | 0x04 | 0x20);
        assert_eq!(caps.into_iter().collect::<Vec<_>>(), vec![Capability::Bridge]);

        assert!(cdp_bits_to_capabilities(0xFFFF_FF00).is_empty());
    }

    #[test]
    fn test_lldp_decode_bits() {
        let caps = lldp_bits_to_capabilities(0x0014);
        assert_eq!(
            caps.into_iter().collect::<Vec<_>>(),
            vec![Capability::Router, Capability::Bridge]
        );

        let caps = lldp_bits_to_capabilities(0x0040);
        assert_eq!(caps.into_iter().collect::<Vec<_>>(), vec![Capability::Other]);
    }

    #[test]
    fn test_switch_maps_per_protocol() {
        assert_eq!(cdp_bits_from_names(&["switch"]), 0x08);
        assert_eq!(lldp_bits_from_names(&["switch"]), 0x0004);
        assert_eq!(lldp_bits_from_names(&["switch", "bridge"]), 0x0004);
        assert_eq!(cdp_bits_from_names(&["router", "Switch"]), 0x09);
        assert_eq!(lldp_bits_from_names(&["router", "phone"]), 0x0030);
    }

    #[test]
    fn test_default_to_station() {
        let empty: [&str; 0] = [];
        assert_eq!(cdp_bits_from_names(&empty), CDP_STATION);
        assert_eq!(lldp_bits_from_names(&empty), LLDP_STATION);
        assert_eq!(cdp_bits_from_names(&["toaster", ""]), CDP_STATION);
        assert_eq!(lldp_bits_from_names(&["toaster"]), LLDP_STATION);

        // no CDP bit for an access point
        assert_eq!(cdp_bits_from_names(&["access-point"]), CDP_STATION);
        assert_eq!(lldp_bits_from_names(&["access-point"]), 0x0008);
    }

    #[test]
    fn test_cdp_fixed_point() {
        for caps in all_subsets() {
            let mut expected: BTreeSet<Capability> = caps
                .iter()
                .copied()
                .filter(|c| !matches!(c, Capability::AccessPoint | Capability::Other))
                .collect();
            if expected.is_empty() {
                expected.insert(Capability::Station);
            }

            let decoded = cdp_bits_to_capabilities(cdp_capabilities_to_bits(&caps));
            assert_eq!(decoded, expected, "input {:?}", caps);
            assert_eq!(cdp_bits_to_capabilities(cdp_capabilities_to_bits(&decoded)), decoded);
        }
    }

    #[test]
    fn test_lldp_fixed_point() {
        for caps in all_subsets() {
            let mut expected: BTreeSet<Capability> = caps
                .iter()
                .map(|c| match c {
                    Capability::Switch => Capability::Bridge,
                    other => *other,
                })
                .collect();
            if expected.is_empty() {
                expected.insert(Capability::Station);
            }

            let decoded = lldp_bits_to_capabilities(lldp_capabilities_to_bits(&caps));
            assert_eq!(decoded, expected, "input {:?}", caps);
            assert_eq!(lldp_bits_to_capabilities(lldp_capabilities_to_bits(&decoded)), decoded);
        }
    }
}
