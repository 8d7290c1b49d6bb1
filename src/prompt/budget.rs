//! Breadth-first allocation of a byte budget across file diffs.
//!
//! Every chunk starts at its header line. The remaining budget is then spent
//! in three passes (structural lines, capped, full); each pass walks the
//! chunks in diff order and upgrades any chunk whose marginal cost still
//! fits. A large early file therefore cannot starve the files after it of
//! their structural summary.

use tracing::debug;

use crate::prompt::variants::{ChunkVariants, Tier};

/// Outcome of [`allocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// The chosen renderings joined with newlines; never longer than the budget.
    pub body: String,
    /// `true` when the budget could not even name every chunk.
    pub partial: bool,
    /// Chosen tier per chunk, `None` for chunks left out entirely.
    pub tiers: Vec<Option<Tier>>,
}

/// Fits `variants` into `budget` bytes.
pub fn allocate(variants: &[ChunkVariants], budget: usize) -> Allocation {
    if budget == 0 || variants.is_empty() {
        return Allocation {
            body: String::new(),
            partial: !variants.is_empty(),
            tiers: vec![None; variants.len()],
        };
    }

    let header_total = variants
        .iter()
        .map(|v| v.len(Tier::Header))
        .sum::<usize>()
        + (variants.len() - 1);
    if budget < header_total {
        debug!(budget, header_total, "budget too small for all headers");
        return partial_headers(variants, budget);
    }

    let mut tiers = vec![Tier::Header; variants.len()];
    let mut remaining = budget - header_total;
    for target in Tier::upgrades() {
        for (variant, tier) in variants.iter().zip(tiers.iter_mut()) {
            let cost = variant.len(target).saturating_sub(variant.len(*tier));
            if cost <= remaining {
                *tier = target;
                remaining -= cost;
            }
        }
        debug!(?target, remaining, "upgrade pass finished");
    }

    let body = variants
        .iter()
        .zip(&tiers)
        .map(|(variant, tier)| variant.get(*tier))
        .collect::<Vec<_>>()
        .join("\n");

    Allocation {
        body,
        partial: false,
        tiers: tiers.into_iter().map(Some).collect(),
    }
}

/// Names as many chunks as fit, in order, stopping at the first that does not.
fn partial_headers(variants: &[ChunkVariants], budget: usize) -> Allocation {
    let mut shown: Vec<&str> = Vec::new();
    let mut used = 0;
    for variant in variants {
        let separator = usize::from(!shown.is_empty());
        let needed = variant.len(Tier::Header) + separator;
        if used + needed > budget {
            break;
        }
        used += needed;
        shown.push(variant.get(Tier::Header));
    }

    let tiers = (0..variants.len())
        .map(|i| (i < shown.len()).then_some(Tier::Header))
        .collect();
    Allocation {
        body: shown.join("\n"),
        partial: true,
        tiers,
    }
}
