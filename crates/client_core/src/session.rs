use rand::Rng;
use shared::domain::SessionId;

const SESSION_PREFIX: &str = "user_";
const SESSION_SUFFIX_LEN: usize = 9;
const SESSION_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random `user_` + 9 base-36 characters. Good enough to keep concurrent
/// conversations apart on the backend, not a secret.
pub fn generate_session_id() -> SessionId {
    generate_session_id_with(&mut rand::thread_rng())
}

pub fn generate_session_id_with<R: Rng + ?Sized>(rng: &mut R) -> SessionId {
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| SESSION_ALPHABET[rng.gen_range(0..SESSION_ALPHABET.len())] as char)
        .collect();
    SessionId(format!("{SESSION_PREFIX}{suffix}"))
}
