//! Heatshrink-compatible LZSS compressor.
//!
//! Output is a MSB-first bit stream. A literal is a `1` flag bit followed by
//! the byte; a back-reference is a `0` flag bit, `distance - 1` in
//! [`WINDOW_SZ2`] bits and `length - 1` in [`LOOKAHEAD_SZ2`] bits. The last
//! byte is padded with zero bits.
//!
//! The window and lookahead sizes are part of the on-device format and are
//! fixed here.

/// Window size exponent (256 byte window).
pub const WINDOW_SZ2: u8 = 8;

/// Lookahead size exponent (16 byte maximum match).
pub const LOOKAHEAD_SZ2: u8 = 4;

const WINDOW_SIZE: usize = 1 << WINDOW_SZ2;
const LOOKAHEAD_SIZE: usize = 1 << LOOKAHEAD_SZ2;

/// Matches no longer than this are cheaper as literals.
const BREAK_EVEN: usize = (1 + WINDOW_SZ2 as usize + LOOKAHEAD_SZ2 as usize) / 8;

/// Size of the little-endian length header of a compressed block.
pub const BLOCK_HEADER_LEN: usize = 2;

#[derive(Debug, Default)]
struct BitWriter {
    out: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    fn push(&mut self, value: u16, count: u8) {
        for shift in (0..count).rev() {
            self.current = (self.current << 1) | ((value >> shift) & 1) as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.out.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.out.push(self.current << (8 - self.filled));
        }
        self.out
    }
}

/// Find the longest earlier match for `input[pos..]`.
///
/// Returns `(distance, length)`. Nearer candidates win ties, and matches may
/// overlap the current position since the decoder copies byte by byte.
fn longest_match(input: &[u8], pos: usize) -> Option<(usize, usize)> {
    let max_len = LOOKAHEAD_SIZE.min(input.len() - pos);
    let lookahead = &input[pos..pos + max_len];
    let mut best: Option<(usize, usize)> = None;

    for candidate in (pos.saturating_sub(WINDOW_SIZE)..pos).rev() {
        let len = input[candidate..].iter().zip(lookahead).take_while(|(a, b)| a == b).count();
        if len > best.map_or(0, |(_, l)| l) {
            best = Some((pos - candidate, len));
            if len == max_len {
                break;
            }
        }
    }

    best
}

/// Compress a byte buffer.
///
/// Never fails; empty input yields empty output.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::default();
    let mut pos = 0;

    while pos < input.len() {
        match longest_match(input, pos) {
            Some((distance, length)) if length > BREAK_EVEN => {
                writer.push(0, 1);
                writer.push((distance - 1) as u16, WINDOW_SZ2);
                writer.push((length - 1) as u16, LOOKAHEAD_SZ2);
                pos += length;
            }
            _ => {
                writer.push(1, 1);
                writer.push(u16::from(input[pos]), 8);
                pos += 1;
            }
        }
    }

    writer.finish()
}

/// Compress and prepend the u16 little-endian length of the compressed data.
///
/// Returns `None` when the compressed data is too long for the header.
pub fn compress_block(input: &[u8]) -> Option<Vec<u8>> {
    let data = compress(input);
    let len = u16::try_from(data.len()).ok()?;

    let mut block = Vec::with_capacity(BLOCK_HEADER_LEN + data.len());
    block.extend_from_slice(&len.to_le_bytes());
    block.extend_from_slice(&data);
    Some(block)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Reference decoder for the bit stream produced by [`compress`].
    pub(crate) fn decompress(input: &[u8]) -> Vec<u8> {
        let mut bits = input.iter().flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1));
        let mut read = |count: u8| -> Option<usize> {
            let mut value = 0usize;
            for _ in 0..count {
                value = (value << 1) | usize::from(bits.next()?);
            }
            Some(value)
        };

        let mut out = Vec::new();
        while let Some(flag) = read(1) {
            if flag == 1 {
                let Some(byte) = read(8) else { break };
                out.push(byte as u8);
            } else {
                let Some(index) = read(WINDOW_SZ2) else { break };
                let Some(count) = read(LOOKAHEAD_SZ2) else { break };
                let distance = index + 1;
                for _ in 0..=count {
                    let byte = out[out.len() - distance];
                    out.push(byte);
                }
            }
        }
        out
    }

    /// Deterministic pseudo-random bytes (xorshift32).
    pub(crate) fn noise(len: usize, seed: u32) -> Vec<u8> {
        let mut state = seed.max(1);
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_compress_empty() {
        assert!(compress(&[]).is_empty());
        assert_eq!(compress_block(&[]).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_single_literal_bits() {
        // 1 + 0x41 = 1_0100_0001, padded to two bytes
        assert_eq!(compress(&[0x41]), vec![0xa0, 0x80]);
    }

    #[test]
    fn test_run_uses_backreference() {
        // literal 0x00, then distance 1 length 3
        let out = compress(&[0, 0, 0, 0]);
        // 1 00000000 | 0 00000000 0010 -> 22 bits
        assert_eq!(out, vec![0x80, 0x00, 0x08]);
        assert_eq!(decompress(&out), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_two_byte_match_is_referenced() {
        let input = b"abab";
        let out = compress(input);
        // two literals (18 bits) + one back-reference (13 bits)
        assert_eq!(out.len(), 4);
        assert_eq!(decompress(&out), input);
    }

    #[test]
    fn test_roundtrip_patterns() {
        let inputs: Vec<Vec<u8>> = vec![
            vec![0; 1000],
            vec![0xff; 17],
            (0..=255u8).collect(),
            b"the quick brown fox jumps over the quick brown dog".to_vec(),
            (0..4096).map(|i| (i % 7) as u8).collect(),
            noise(2048, 7),
        ];
        for input in inputs {
            assert_eq!(decompress(&compress(&input)), input);
        }
    }

    #[test]
    fn test_match_limited_to_window() {
        let mut input = noise(300, 3);
        let prefix = input[..16].to_vec();
        input.extend_from_slice(&prefix);
        // The repeat sits 300 bytes back, outside the window
        assert_eq!(decompress(&compress(&input)), input);
    }

    #[test]
    fn test_zeros_compress_well() {
        let block = compress_block(&[0; 1000]).unwrap();
        assert!(block.len() < 150);
        let len = u16::from_le_bytes([block[0], block[1]]) as usize;
        assert_eq!(len, block.len() - BLOCK_HEADER_LEN);
        assert_eq!(decompress(&block[BLOCK_HEADER_LEN..]), vec![0; 1000]);
    }

    #[test]
    fn test_noise_expands() {
        let input = noise(1000, 42);
        assert!(compress(&input).len() > input.len());
    }
}
