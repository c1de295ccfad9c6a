//! Helpers for computing frame checksums.

use super::format::ChecksumKind;

/// Accumulate a slice of bytes into a checksum byte.
pub fn compute_checksum(kind: ChecksumKind, r: &[u8]) -> u8 {
    let sum = r.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));

    match kind {
        ChecksumKind::SumMod256 => sum,
        ChecksumKind::InvertedSumMod256 => !sum,
    }
}

/// Whether a span of bytes matches the checksum found alongside it.
pub fn validate_checksum(kind: ChecksumKind, r: &[u8], found: u8) -> bool {
    compute_checksum(kind, r) == found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_modulo_256() {
        let span = [0x59, 0x59, 0x64, 0x00, 0xC8, 0x00, 0x00, 0x00];
        assert_eq!(compute_checksum(ChecksumKind::SumMod256, &span), 0xDE);
    }

    #[test]
    fn inverts_sum() {
        assert_eq!(compute_checksum(ChecksumKind::InvertedSumMod256, &[0, 0, 0]), 0xFF);
        assert_eq!(compute_checksum(ChecksumKind::InvertedSumMod256, &[0x10, 0x20, 0x30]), 0x9F);
    }

    #[test]
    fn empty_span() {
        assert_eq!(compute_checksum(ChecksumKind::SumMod256, &[]), 0x00);
        assert_eq!(compute_checksum(ChecksumKind::InvertedSumMod256, &[]), 0xFF);
    }
}
