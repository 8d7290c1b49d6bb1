//! Size-ordered renderings of a single file diff.

use crate::utils::text;

/// Default size of the capped rendering, in bytes.
pub const DEFAULT_CAPPED_CHARS: usize = 2000;

/// Marker inserted where the capped rendering drops the middle of a diff.
pub(crate) const CAPPED_MARKER: &str = "\n[commitsmith] diff truncated to fit max_prompt_chars\n";

/// Line prefixes that carry file or hunk metadata rather than content.
const STRUCTURAL_PREFIXES: &[&str] = &[
    "diff --git ",
    "index ",
    "--- ",
    "+++ ",
    "@@ ",
    "new file mode ",
    "deleted file mode ",
    "old mode ",
    "new mode ",
    "similarity index ",
    "dissimilarity index ",
    "rename from ",
    "rename to ",
];

/// Detail level of a rendered chunk, from least to most informative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// The `diff --git` line alone.
    Header,
    /// Header, index, file and hunk header lines.
    StructuralLines,
    /// The whole chunk, middle-elided to the capped size.
    Capped,
    /// The unmodified chunk.
    Full,
}

impl Tier {
    /// Number of tiers.
    pub const COUNT: usize = 4;

    /// All tiers in ascending order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Header,
        Self::StructuralLines,
        Self::Capped,
        Self::Full,
    ];

    /// Position of the tier in [`Tier::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Tiers a chunk can be upgraded to, in pass order.
    pub fn upgrades() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().skip(1)
    }
}

/// The four renderings of one chunk, each no longer than the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkVariants {
    renderings: [String; Tier::COUNT],
}

impl ChunkVariants {
    /// Builds every rendering of `chunk`, capping the [`Tier::Capped`]
    /// rendering at `capped_chars` bytes (`0` leaves it uncapped).
    pub fn build(chunk: &str, capped_chars: usize) -> Self {
        let mut renderings = [
            header_line(chunk).to_string(),
            structural_lines(chunk),
            text::elide_middle(chunk, capped_chars, CAPPED_MARKER),
            chunk.to_string(),
        ];
        // Clamp top-down so sizes never decrease with the tier.
        for i in (0..Tier::COUNT - 1).rev() {
            if renderings[i].len() > renderings[i + 1].len() {
                renderings[i] = renderings[i + 1].clone();
            }
        }
        Self { renderings }
    }

    /// Text of the given rendering.
    pub fn get(&self, tier: Tier) -> &str {
        &self.renderings[tier.index()]
    }

    /// Byte length of the given rendering.
    pub fn len(&self, tier: Tier) -> usize {
        self.renderings[tier.index()].len()
    }
}

/// Returns `true` for lines that describe the change rather than its content.
pub fn is_structural_line(line: &str) -> bool {
    STRUCTURAL_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn header_line(chunk: &str) -> &str {
    chunk.split('\n').next().unwrap_or(chunk)
}

fn structural_lines(chunk: &str) -> String {
    let lines: Vec<&str> = chunk
        .split('\n')
        .filter(|line| is_structural_line(line))
        .collect();
    if lines.is_empty() {
        header_line(chunk).to_string()
    } else {
        lines.join("\n")
    }
}
