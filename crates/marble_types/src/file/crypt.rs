//! Repeating-key XOR cipher applied to script members in MBL archives.

/// Applies a repeating-key XOR to `data`, returning a new buffer.
///
/// The cipher is symmetric: applying it twice with the same key restores the
/// input. An empty key leaves the data unchanged.
pub fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
	if key.is_empty() {
		return data.to_vec();
	}

	data.iter().enumerate().map(|(i, &byte)| byte ^ key[i % key.len()]).collect()
}
