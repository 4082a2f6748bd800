//! CRC16 used to validate persisted records
//!
//! CCITT polynomial 0x1021, MSB first, initial value 0xFFFF, no final XOR
//! (CRC-16/CCITT-FALSE).

const POLY: u16 = 0x1021;

/// Initial register value
pub const CRC16_INIT: u16 = 0xFFFF;

/// Feed `data` into a running CRC
pub fn crc16_update(crc: u16, data: &[u8]) -> u16 {
    let mut crc = crc;

    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// CRC16 of a complete buffer
pub fn crc16(data: &[u8]) -> u16 {
    crc16_update(CRC16_INIT, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_is_init() {
        assert_eq!(crc16(&[]), CRC16_INIT);
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let data = b"pixel matrix clock";
        let split = crc16_update(crc16_update(CRC16_INIT, &data[..5]), &data[5..]);
        assert_eq!(split, crc16(data));
    }
}
