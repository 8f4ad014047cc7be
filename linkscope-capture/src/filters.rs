//! BPF filter for discovery traffic

/// Everything sent to either discovery multicast address
///
/// Protocol checks happen in the decoders, so this stays a pure
/// destination match.
pub fn discovery_filter() -> String {
    "ether dst 01:00:0c:cc:cc:cc or ether dst 01:80:c2:00:00:0e".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_filter() {
        let filter = discovery_filter();
        assert!(filter.contains("01:00:0c:cc:cc:cc"));
        assert!(filter.contains("01:80:c2:00:00:0e"));
        assert!(!filter.contains("and"));
    }
}
