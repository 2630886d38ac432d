//! Common volume shapes for tests, as `[n_inline, n_crossline, n_sample]`.

/// Tiny volume that fits in one chunk.
pub const TINY_VOLUME: [u64; 3] = [4, 6, 8];

/// Small volume whose slices span several 16-sample tiles with ragged edges.
pub const SMALL_VOLUME: [u64; 3] = [10, 37, 50];

/// Chunk shape used by the fixture writers.
pub const FIXTURE_CHUNKS: [u64; 3] = [4, 16, 16];
