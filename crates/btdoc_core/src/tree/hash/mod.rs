/// Hash a field or type key the way the current-format writer does.
///
/// This is the 64-bit .NET Framework string hash: two interleaved djb2-xor
/// accumulators over UTF-16 code units, stopping at the first NUL unit.
pub fn name_hash(text: &str) -> i32 {
	let mut units = text.encode_utf16();
	let mut hash1: i32 = 5381;
	let mut hash2: i32 = hash1;

	loop {
		let Some(unit) = units.next().filter(|unit| *unit != 0) else {
			break;
		};
		hash1 = (hash1 << 5).wrapping_add(hash1) ^ i32::from(unit);

		let Some(unit) = units.next().filter(|unit| *unit != 0) else {
			break;
		};
		hash2 = (hash2 << 5).wrapping_add(hash2) ^ i32::from(unit);
	}

	hash1.wrapping_add(hash2.wrapping_mul(1_566_083_941))
}

/// Compose the hash stored for one field row under a scope hash.
pub fn field_hash(scope_hash: i32, type_key: &str, field_name: &str) -> i32 {
	scope_hash.wrapping_add(name_hash(type_key)).wrapping_add(name_hash(field_name))
}

/// Scope hash for the `index`-th collection element under a field hash.
///
/// Writers from 1.5.7 onward divide by the one-based element position.
pub fn element_hash(field_hash: i32, index: usize, per_element: bool) -> i32 {
	if !per_element {
		return field_hash;
	}
	let divisor = i32::try_from(index.saturating_add(1)).unwrap_or(i32::MAX);
	field_hash / divisor
}
