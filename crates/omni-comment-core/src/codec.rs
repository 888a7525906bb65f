//! Fragment encoding and decoding for managed comment bodies.
//!
//! A managed comment is plain markdown interleaved with HTML-comment markers
//! that are invisible in the rendered output. Each job's contribution is one
//! fragment delimited by a `start`/`end` marker pair carrying the section id,
//! so a later invocation can find and replace it without touching anything
//! else. Decoding splits a body into an ordered list of segments (opaque
//! text runs and parsed fragments) that re-renders byte-for-byte, which is
//! what makes in-place replacement safe around bytes this tool does not own.

use tracing::debug;

/// Marker identifying a comment body as managed by this tool.
///
/// This is a fixed constant: changing it would orphan comments created by
/// prior versions, which would then be neither found nor updated.
pub const SIGNATURE_MARKER: &str = "<!-- omni-comment -->";

/// Prefix of a fragment opening marker; the section id and ` -->` follow.
const FRAGMENT_START_PREFIX: &str = "<!-- omni-comment:start:";

/// Prefix of a fragment closing marker; the section id and ` -->` follow.
const FRAGMENT_END_PREFIX: &str = "<!-- omni-comment:end:";

/// Terminator shared by all markers.
const MARKER_SUFFIX: &str = " -->";

/// One job's named, replaceable contribution to the shared comment.
///
/// A `Section` is never mutated after encoding; a later invocation with the
/// same id produces a brand-new value that replaces the old fragment
/// wholesale.
///
/// # Examples
///
/// ```
/// use omni_comment_core::Section;
///
/// let section = Section {
///     id: "lint".into(),
///     title: Some("Lint".into()),
///     collapsed: false,
///     content: "0 errors".into(),
/// };
/// assert_eq!(section.id, "lint");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Identifier unique per logical contributor (e.g., the CI job name).
    pub id: String,

    /// Optional title, rendered as a heading or as the disclosure summary.
    pub title: Option<String>,

    /// When `true`, the content is wrapped in a `<details>` disclosure
    /// block with the title (or the id) as the visible summary.
    pub collapsed: bool,

    /// Markdown body content.
    pub content: String,
}

/// A section's encoded form as it appears in the comment body.
///
/// `raw` holds the exact bytes from the opening marker through the closing
/// marker; `section` is the parsed view. Merging splices on `raw`, so the
/// parsed view never needs to re-render content it did not write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Parsed section recovered from the fragment.
    pub section: Section,

    /// Exact on-wire bytes, markers included.
    pub raw: String,
}

/// One run of a decoded comment body, in body order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Bytes not owned by any fragment (signature line, banner, separators,
    /// malformed markers). Preserved verbatim across merges.
    Text(String),

    /// A well-formed fragment.
    Fragment(Fragment),
}

/// A comment body decoded into ordered segments.
///
/// Invariant: [`render`](Self::render) reproduces the decoded input
/// byte-for-byte as long as no segment was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBody {
    /// Ordered segments covering the entire body.
    pub segments: Vec<Segment>,
}

impl CommentBody {
    /// Renders the segments back into one body string.
    pub fn render(&self) -> String {
        let mut body = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => body.push_str(text),
                Segment::Fragment(fragment) => body.push_str(&fragment.raw),
            }
        }
        body
    }

    /// Returns `true` if a fragment with the given section id exists.
    pub fn contains_fragment(&self, id: &str) -> bool {
        self.fragments().any(|f| f.section.id == id)
    }

    /// Iterates over the fragments in body order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Fragment(fragment) => Some(fragment),
            Segment::Text(_) => None,
        })
    }

    /// Replaces the first fragment with the given section's id in place.
    ///
    /// All other segments keep their exact bytes and positions. Returns
    /// `false` if no fragment with that id exists.
    pub fn replace_fragment(&mut self, section: &Section) -> bool {
        for segment in &mut self.segments {
            if let Segment::Fragment(fragment) = segment
                && fragment.section.id == section.id
            {
                *fragment = Fragment {
                    section: section.clone(),
                    raw: encode_section(section),
                };
                return true;
            }
        }
        false
    }
}

/// Returns `true` if `id` is safe to embed in a fragment marker.
///
/// Ids are limited to alphanumerics, `-`, `_`, and `.` so that an id can
/// never contain marker syntax or whitespace.
pub fn is_valid_section_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Encodes a section into its fragment text, markers included.
///
/// # Examples
///
/// ```
/// use omni_comment_core::{Section, codec::encode_section};
///
/// let section = Section {
///     id: "lint".into(),
///     title: None,
///     collapsed: false,
///     content: "0 errors".into(),
/// };
/// assert_eq!(
///     encode_section(&section),
///     "<!-- omni-comment:start:lint -->\n0 errors\n<!-- omni-comment:end:lint -->",
/// );
/// ```
pub fn encode_section(section: &Section) -> String {
    let open = format!("{FRAGMENT_START_PREFIX}{}{MARKER_SUFFIX}", section.id);
    let close = format!("{FRAGMENT_END_PREFIX}{}{MARKER_SUFFIX}", section.id);

    let inner = if section.collapsed {
        let summary = section.title.as_deref().unwrap_or(&section.id);
        format!(
            "<details>\n<summary>{summary}</summary>\n\n{}\n\n</details>",
            section.content,
        )
    } else if let Some(title) = &section.title {
        format!("### {title}\n\n{}", section.content)
    } else {
        section.content.clone()
    };

    format!("{open}\n{inner}\n{close}")
}

/// Decodes a comment body into ordered segments.
///
/// Anything that is not a well-formed fragment — including text that merely
/// looks like a marker, markers with invalid ids, and opening markers with
/// no matching close — is kept as opaque text rather than rejected, so one
/// malformed fragment can never block merging for every other job.
///
/// # Examples
///
/// ```
/// use omni_comment_core::{Section, codec};
///
/// let section = Section {
///     id: "tests".into(),
///     title: Some("Tests".into()),
///     collapsed: true,
///     content: "5 passed".into(),
/// };
/// let body = codec::decode_body(&codec::encode_section(&section));
/// let fragment = body.fragments().next().unwrap();
/// assert_eq!(fragment.section, section);
/// ```
pub fn decode_body(body: &str) -> CommentBody {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(found) = body[cursor..].find(FRAGMENT_START_PREFIX) {
        let open_start = cursor + found;
        match parse_fragment_at(body, open_start) {
            Some((fragment, end)) => {
                if open_start > text_start {
                    segments.push(Segment::Text(body[text_start..open_start].to_string()));
                }
                segments.push(Segment::Fragment(fragment));
                text_start = end;
                cursor = end;
            }
            None => {
                debug!(offset = open_start, "Treating malformed fragment marker as plain text");
                cursor = open_start + FRAGMENT_START_PREFIX.len();
            }
        }
    }

    if text_start < body.len() || body.is_empty() {
        segments.push(Segment::Text(body[text_start..].to_string()));
    }

    CommentBody { segments }
}

/// Parses one fragment whose opening marker starts at `open_start`.
///
/// Returns the fragment and the byte offset just past its closing marker,
/// or `None` when the marker pair is malformed.
fn parse_fragment_at(body: &str, open_start: usize) -> Option<(Fragment, usize)> {
    let id_start = open_start + FRAGMENT_START_PREFIX.len();
    let id_len = body[id_start..].find(MARKER_SUFFIX)?;
    let id = &body[id_start..id_start + id_len];
    if !is_valid_section_id(id) {
        return None;
    }

    let open_end = id_start + id_len + MARKER_SUFFIX.len();
    let close = format!("{FRAGMENT_END_PREFIX}{id}{MARKER_SUFFIX}");
    let close_start = open_end + body[open_end..].find(&close)?;
    let end = close_start + close.len();

    // The encoder always puts the markers on their own lines; tolerate
    // hand-edited fragments where those newlines went missing.
    let inner = &body[open_end..close_start];
    let inner = inner.strip_prefix('\n').unwrap_or(inner);
    let inner = inner.strip_suffix('\n').unwrap_or(inner);

    let (title, collapsed, content) = parse_inner(id, inner);
    let section = Section {
        id: id.to_string(),
        title,
        collapsed,
        content,
    };

    Some((
        Fragment {
            section,
            raw: body[open_start..end].to_string(),
        },
        end,
    ))
}

/// Recovers `(title, collapsed, content)` from a fragment interior.
///
/// Interiors that match neither the disclosure nor the heading layout are
/// plain content with no title.
fn parse_inner(id: &str, inner: &str) -> (Option<String>, bool, String) {
    if let Some(rest) = inner.strip_prefix("<details>\n<summary>")
        && let Some((summary, tail)) = rest.split_once("</summary>")
        && let Some(content) = tail
            .strip_prefix("\n\n")
            .and_then(|t| t.strip_suffix("\n\n</details>"))
    {
        // A titleless collapsed section is encoded with its id as the
        // summary; map that back to "no title".
        let title = (summary != id).then(|| summary.to_string());
        return (title, true, content.to_string());
    }

    if let Some(rest) = inner.strip_prefix("### ")
        && let Some((title, content)) = rest.split_once("\n\n")
        && !title.contains('\n')
    {
        return (Some(title.to_string()), false, content.to_string());
    }

    (None, false, inner.to_string())
}
