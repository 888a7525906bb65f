//! Merging one section into a managed comment body.
//!
//! The merge is a pure text transformation so it can be tested without any
//! transport in the loop. Position is sticky: the first write of a section
//! decides where its fragment lives, and later writes only swap that
//! fragment's bytes. Everything the tool does not own — the signature line,
//! a configured banner, bytes left by hand edits — passes through verbatim.

use crate::codec::{self, SIGNATURE_MARKER, Section};

/// Produces the new full comment body for a section merge.
///
/// With no existing body, the result is the signature marker, the optional
/// preamble banner, and the encoded section, joined by blank lines. With an
/// existing body, the same-id fragment is replaced in place; a section whose
/// id is not present yet is appended at the end.
///
/// The only whitespace normalization is on the append path, which trims
/// trailing whitespace from the existing body before joining with one blank
/// line. Replacement leaves every byte outside the fragment untouched, so
/// re-merging identical content is byte-stable.
///
/// # Examples
///
/// ```
/// use omni_comment_core::{Section, merge_section};
///
/// let section = Section {
///     id: "lint".into(),
///     title: None,
///     collapsed: false,
///     content: "0 errors".into(),
/// };
/// let first = merge_section(None, &section, None);
/// let second = merge_section(Some(&first), &section, None);
/// assert_eq!(first, second);
/// ```
pub fn merge_section(existing: Option<&str>, section: &Section, preamble: Option<&str>) -> String {
    match existing {
        None => {
            let mut parts = vec![SIGNATURE_MARKER.to_string()];
            if let Some(banner) = preamble
                && !banner.trim().is_empty()
            {
                parts.push(banner.trim_end().to_string());
            }
            parts.push(codec::encode_section(section));
            parts.join("\n\n")
        }
        Some(body) => {
            let mut decoded = codec::decode_body(body);
            if decoded.replace_fragment(section) {
                decoded.render()
            } else {
                format!("{}\n\n{}", body.trim_end(), codec::encode_section(section))
            }
        }
    }
}
