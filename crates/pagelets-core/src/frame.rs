//! Transport framing.
//!
//! Every serialized response starts with the sentinel `)]}'`. A body that
//! starts with it is not valid script, so it cannot be executed if it is ever
//! loaded through a `<script>` tag. The client strips exactly this prefix
//! before decoding the JSON.

/// Anti-hijacking prefix written before every JSON body.
pub const SENTINEL: &[u8] = b")]}'";

/// Strip the sentinel from a framed body, returning the JSON that follows.
pub fn unframe(bytes: &[u8]) -> Result<&[u8], FrameError> {
    bytes
        .strip_prefix(SENTINEL)
        .ok_or(FrameError::MissingSentinel)
}

/// Error reading a framed body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("pagelet body must start with the `)]}}'` sentinel")]
    MissingSentinel,
}
