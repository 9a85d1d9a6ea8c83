use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub fn random_string(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

/// A uniform random 6-digit join code
pub fn random_pin() -> String {
    let mut rng = thread_rng();
    rng.gen_range(100_000..=999_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_are_six_digits() {
        for _ in 0..1000 {
            let pin = random_pin();

            assert_eq!(pin.len(), 6);
            assert!(
                pin.chars().all(|c| c.is_ascii_digit()),
                "pin should only contain digits: {pin}"
            );
        }
    }

    #[test]
    fn test_random_strings_have_requested_length() {
        assert_eq!(random_string(32).len(), 32);
        assert_eq!(random_string(0).len(), 0);
    }
}
