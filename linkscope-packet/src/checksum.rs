//! Internet checksum (RFC 1071)
//!
//! CDP protects its payload with the same one's-complement checksum used by
//! IP, TCP and UDP headers.

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// The data is summed as big-endian 16-bit words. A trailing odd byte is
/// treated as the high byte of a final word. Carries are folded back into the
/// low 16 bits before the one's complement is taken.
///
/// # Examples
///
/// ```
/// use linkscope_packet::checksum::internet_checksum;
///
/// let data = [0x02, 0xb4, 0x00, 0x00];
/// assert_eq!(internet_checksum(&data), !0x02b4u16);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    !ones_complement_sum(data)
}

/// Folded one's-complement sum, before complementing
fn ones_complement_sum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    sum as u16
}

/// Computes the checksum of `data` with the 16-bit field at `offset` treated
/// as zero, and writes it into that field.
///
/// Returns `None` if the field does not fit inside `data`.
pub fn insert_checksum(data: &mut [u8], offset: usize) -> Option<u16> {
    let field = data.get_mut(offset..offset.checked_add(2)?)?;
    field.copy_from_slice(&[0, 0]);
    let checksum = internet_checksum(data);
    data[offset..offset + 2].copy_from_slice(&checksum.to_be_bytes());
    Some(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // RFC 1071 section 3 example
        let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        assert_eq!(ones_complement_sum(&data), 0xddf2);
        assert_eq!(internet_checksum(&data), !0xddf2u16);
    }

    #[test]
    fn test_odd_length_pads_high_byte() {
        assert_eq!(internet_checksum(&[0xAB]), !0xAB00u16);
        assert_eq!(internet_checksum(&[0x12, 0x34, 0x56]), !(0x1234u16 + 0x5600));
    }

    #[test]
    fn test_carry_folding() {
        let data = [0xFF, 0xFF, 0x00, 0x02];
        // 0xFFFF + 0x0002 = 0x10001 -> 0x0002
        assert_eq!(internet_checksum(&data), !0x0002u16);
    }

    #[test]
    fn test_empty() {
        assert_eq!(internet_checksum(&[]), 0xFFFF);
    }

    #[test]
    fn test_insert_then_resum_is_zero() {
        let payloads: [&[u8]; 3] = [
            &[0x02, 0xb4, 0x00, 0x00, 0x00, 0x01, 0x00, 0x07, b's', b'w', b'1'],
            &[0x02, 0x14, 0xAA, 0xBB, 0xFF, 0xFF, 0xFF],
            &[0x01, 0x00, 0x00, 0x00],
        ];

        for payload in payloads {
            let mut data = payload.to_vec();
            insert_checksum(&mut data, 2).unwrap();
            assert_eq!(internet_checksum(&data), 0, "payload {:02x?}", payload);
        }
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut data = [0u8; 3];
        assert!(insert_checksum(&mut data, 2).is_none());
        assert!(insert_checksum(&mut data, usize::MAX).is_none());
    }
}
