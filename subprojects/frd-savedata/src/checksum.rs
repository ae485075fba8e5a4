//! CRC-16 used to seal Mii records.
//!
//! The console stores a CRC-16/XMODEM (polynomial `0x1021`, initial value 0, no reflection,
//! no final xor) over the Mii data and its padding. The value is a bit-exact interop contract.
//!
//! See: <https://www.3dbrew.org/wiki/Mii#Checksum>

/// CCITT polynomial.
const POLY: u16 = 0x1021;

/// Lookup table for byte-at-a-time CRC computation.
const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Computes the CRC-16/XMODEM of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |crc, &byte| {
        (crc << 8) ^ TABLE[usize::from((crc >> 8) as u8 ^ byte)]
    })
}
