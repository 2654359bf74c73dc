pub mod ip;
pub mod password;
pub mod validators;

/// Length of generated short codes.
pub const GENERATED_CODE_LENGTH: usize = 8;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    // rand's thread RNG is a CSPRNG reseeded from the OS
    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code_shape() {
        let code = generate_random_code(GENERATED_CODE_LENGTH);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_random_code_varies() {
        let a = generate_random_code(GENERATED_CODE_LENGTH);
        let b = generate_random_code(GENERATED_CODE_LENGTH);
        // 62^8 possibilities; a repeat here means the source is broken
        assert_ne!(a, b);
    }
}
