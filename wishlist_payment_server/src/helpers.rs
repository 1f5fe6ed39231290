use std::fmt::Write;

use md5::Md5;
use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 digest of `data`. HotPay signs its parameter concatenations with this.
pub fn sha256_hex(data: &[u8]) -> String {
    to_hex(&Sha256::digest(data))
}

/// Lower-case hex MD5 digest of `data`. PayU's default notification signature algorithm.
pub fn md5_hex(data: &[u8]) -> String {
    to_hex(&Md5::digest(data))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(2 * bytes.len()), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
