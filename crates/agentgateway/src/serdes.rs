/// `#[serde(skip_serializing_if = "is_default")]` for any `Default + PartialEq` field, so we don't
/// have to spell out `Vec::is_empty`/`Option::is_none`/`String::is_empty` per field.
pub fn is_default<T: Default + PartialEq>(t: &T) -> bool {
	*t == T::default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		assert!(is_default(&0u32));
		assert!(is_default(&false));
		assert!(is_default(&String::new()));
		assert!(!is_default(&"x".to_string()));
		assert!(is_default::<Option<u32>>(&None));
		assert!(!is_default(&Some(1u32)));
	}
}
