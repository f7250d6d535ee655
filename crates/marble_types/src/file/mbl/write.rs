//! MBL archive construction.
//!
//! The builder lays the index out exactly as the engine expects: count word,
//! the v3 name-width word when applicable, fixed-width records, the v1/v2
//! padding word, then the payloads back to back in member order.

use super::{Version, constants, is_data_archive};
use crate::file::{
	FileType, MarbleError, crypt,
	io::{WriteLeExt, encode_sjis, write_fixed_string},
};

#[derive(Debug, Clone)]
struct Member {
	name: String,
	data: Vec<u8>,
}

impl Member {
	/// Whether this member's payload is stored encrypted
	fn is_script(&self) -> bool {
		self.name.to_ascii_lowercase().ends_with(".s")
	}

	/// On-disk form of the name: uppercase, extension folded behind a null.
	/// A `.s` extension keeps its canonical single-letter encoding.
	fn stored_name(&self) -> String {
		match self.name.rsplit_once('.') {
			Some((base, ext)) if ext.eq_ignore_ascii_case("s") => {
				format!("{}\0S", base.to_uppercase())
			}
			Some((base, ext)) => {
				format!("{}\0{}", base.to_uppercase(), ext.to_uppercase())
			}
			None => self.name.to_uppercase(),
		}
	}
}

/// Assembles an MBL archive from in-memory members.
///
/// Members are written in insertion order, which is the order the manifest
/// lists them in.
#[derive(Debug, Clone)]
pub struct Builder {
	version: Version,
	key: Vec<u8>,
	script_archive: bool,
	members: Vec<Member>,
}

impl Builder {
	/// Creates a builder for the given layout revision
	pub fn new(version: Version) -> Self {
		Self {
			version,
			key: Vec::new(),
			script_archive: false,
			members: Vec::new(),
		}
	}

	/// Sets the XOR key applied to script members
	pub fn key(&mut self, key: Vec<u8>) -> &mut Self {
		self.key = key;
		self
	}

	/// Marks every member as a script (archive stem ends `_data`)
	pub fn script_archive(&mut self, script_archive: bool) -> &mut Self {
		self.script_archive = script_archive;
		self
	}

	/// Derives the script policy from the archive's target path
	pub fn for_archive_path(&mut self, path: impl AsRef<std::path::Path>) -> &mut Self {
		self.script_archive(is_data_archive(path))
	}

	/// Appends a member in extracted form (`base.ext` name plus plain data)
	pub fn add_member(&mut self, name: impl Into<String>, data: Vec<u8>) -> &mut Self {
		self.members.push(Member {
			name: name.into(),
			data,
		});
		self
	}

	/// Serializes the archive.
	///
	/// Fails when a member name does not fit the layout's name field, or if
	/// the payload cursor ever diverges from the precomputed index.
	pub fn build(&self) -> Result<Vec<u8>, MarbleError> {
		if self.members.is_empty() {
			return Err(MarbleError::malformed_archive(
				FileType::Mbl,
				"an archive needs at least one member".to_string(),
			));
		}

		let stored_names: Vec<String> =
			self.members.iter().map(Member::stored_name).collect();
		let encoded_names: Vec<Vec<u8>> =
			stored_names.iter().map(|name| encode_sjis(name)).collect();

		let filename_length = self.name_field_width(&encoded_names)?;
		let header_size = self.version.header_size();
		let record_size = filename_length + 8;
		let index_size = header_size + self.members.len() * record_size;
		let padding = if self.version.has_index_padding() {
			constants::INDEX_PADDING
		} else {
			0
		};

		let total_size: usize = index_size
			+ padding
			+ self.members.iter().map(|member| member.data.len()).sum::<usize>();
		let mut output = Vec::with_capacity(total_size);

		output.write_u32_le(self.members.len() as u32)?;
		if self.version == Version::V3 {
			output.write_u32_le(filename_length as u32)?;
		}

		let mut offset = index_size + padding;
		for (index, member) in self.members.iter().enumerate() {
			match self.version {
				Version::V1 | Version::V2 => {
					// Validated above to leave room for the trailing null
					output.extend_from_slice(&write_fixed_string(
						&stored_names[index],
						filename_length,
					));
				}
				Version::V3 => {
					// v3 names may fill the field completely
					let mut field = encoded_names[index].clone();
					field.resize(filename_length, 0);
					output.extend_from_slice(&field);
				}
			}

			output.write_u32_le(offset as u32)?;
			output.write_u32_le(member.data.len() as u32)?;
			offset += member.data.len();
		}

		if padding > 0 {
			output.extend_from_slice(&[0u8; constants::INDEX_PADDING]);
		}

		let mut expected = index_size + padding;
		for member in &self.members {
			if output.len() != expected {
				return Err(MarbleError::LayoutMismatch {
					file_type: FileType::Mbl,
					expected,
					actual: output.len(),
				});
			}

			if self.script_archive || member.is_script() {
				output.extend_from_slice(&crypt::xor(&member.data, &self.key));
			} else {
				output.extend_from_slice(&member.data);
			}
			expected += member.data.len();
		}

		Ok(output)
	}

	/// Width of the name field for this archive, validating every member
	/// name against it.
	fn name_field_width(&self, encoded_names: &[Vec<u8>]) -> Result<usize, MarbleError> {
		match self.version.fixed_name_length() {
			Some(fixed) => {
				for (member, encoded) in self.members.iter().zip(encoded_names) {
					if encoded.is_empty() {
						return Err(MarbleError::malformed_archive(
							FileType::Mbl,
							"member with an empty name".to_string(),
						));
					}
					// Fixed layouts keep at least one trailing null
					if encoded.len() >= fixed {
						return Err(MarbleError::NameTooLong {
							file_type: FileType::Mbl,
							name: member.name.clone(),
							max: fixed - 1,
						});
					}
				}
				Ok(fixed)
			}
			None => {
				let mut widest = 0;
				for (member, encoded) in self.members.iter().zip(encoded_names) {
					if encoded.is_empty() {
						return Err(MarbleError::malformed_archive(
							FileType::Mbl,
							"member with an empty name".to_string(),
						));
					}
					if encoded.len() > constants::MAX_NAME_LEN {
						return Err(MarbleError::NameTooLong {
							file_type: FileType::Mbl,
							name: member.name.clone(),
							max: constants::MAX_NAME_LEN,
						});
					}
					widest = widest.max(encoded.len());
				}
				Ok(widest)
			}
		}
	}
}
