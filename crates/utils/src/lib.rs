use rand::Rng;

/// Generates a random alphanumeric secret of the given length
pub fn create_random_secret(secret_len: usize) -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(rand::distributions::Alphanumeric)
        .take(secret_len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn generates_secret_of_given_length() {
        for len in [0, 1, 16, 64].iter() {
            let secret = create_random_secret(*len);
            assert_eq!(secret.len(), *len);
            assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
