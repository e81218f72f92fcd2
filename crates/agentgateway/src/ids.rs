//! Foreign message IDs: `msg_01` followed by a base58 encoding of 16 cryptographically random
//! bytes. `bs58`'s default alphabet already excludes `0`, `O`, `I`, `l` and preserves leading
//! zero bytes as leading `'1'`s, so no custom alphabet table is needed.

use rand::RngCore;

const PREFIX: &str = "msg_01";

pub fn new_message_id() -> String {
	let mut bytes = [0u8; 16];
	rand::rng().fill_bytes(&mut bytes);
	format!("{PREFIX}{}", bs58::encode(bytes).into_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn has_expected_prefix_and_charset() {
		let id = new_message_id();
		assert!(id.starts_with(PREFIX));
		let encoded = &id[PREFIX.len()..];
		assert!(!encoded.is_empty());
		assert!(
			encoded
				.chars()
				.all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
		);
	}

	#[test]
	fn ids_are_not_repeated() {
		let a = new_message_id();
		let b = new_message_id();
		assert_ne!(a, b);
	}
}
