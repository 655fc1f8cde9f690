use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// 192 bits of entropy, comfortably above the 128-bit floor.
const LEASE_TOKEN_BYTES: usize = 24;

pub fn generate_lease_token() -> String {
    let mut bytes = [0u8; LEASE_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn format_job_id(id: i64) -> String {
    format!("job_{id}")
}

pub fn parse_job_id(wire_id: &str) -> Option<i64> {
    let digits = wire_id.strip_prefix("job_")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
