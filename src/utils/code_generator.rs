use chrono::Utc;
use rand::Rng;
use std::ops::RangeInclusive;

/// Uniform candidate lucky number; uniqueness is checked by the caller.
pub fn generate_lucky_number(range: &RangeInclusive<i32>) -> i32 {
    let mut rng = rand::thread_rng();
    rng.gen_range(range.clone())
}

/// Opaque session token: md5 over the current time and a random salt, 12 hex chars.
pub fn generate_session_id() -> String {
    let salt: u64 = rand::thread_rng().r#gen();
    let seed = format!("{}-{salt}", Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true));
    let digest = format!("{:x}", md5::compute(seed.as_bytes()));
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lucky_number_in_range() {
        let range = 1000..=9999;
        for _ in 0..1000 {
            let n = generate_lucky_number(&range);
            assert!(range.contains(&n));
        }
        assert_eq!(generate_lucky_number(&(4242..=4242)), 4242);
    }

    #[test]
    fn test_session_id_shape() {
        let id = generate_session_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        // salted, so two ids in the same instant still differ
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
