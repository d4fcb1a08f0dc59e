use crate::model::{Region, SourceBuffer};

/// Replaces `region` in `buffer` with `replacement`, returning a new buffer.
///
/// Every line in the inclusive region is removed and the replacement is
/// inserted at that position as one buffer entry, internal newlines intact;
/// it is only broken into lines again if the caller joins and re-splits the
/// whole buffer. The input buffer is not touched.
///
/// The region must be in-bounds; callers clamp first (see
/// [`Region::clamp_to`]).
pub fn splice(buffer: &SourceBuffer, region: Region, replacement: &str) -> SourceBuffer {
    let lines = buffer.lines();
    let mut patched = Vec::with_capacity(lines.len() - region.len() + 1);

    patched.extend_from_slice(&lines[..region.start]);
    patched.push(replacement.to_string());
    patched.extend_from_slice(&lines[region.end + 1..]);

    SourceBuffer::from_lines(patched)
}
