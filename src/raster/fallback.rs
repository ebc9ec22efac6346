use super::flood::{Segmentation, seed_cells};
use super::grid::CellMask;
use crate::domain::{SeedKind, SeedPoint};
use crate::geometry::GridMapper;

/// Outcome of choosing between the confirmed and candidate land masks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackDecision {
    /// Land seeds that fell inside the confirmed land
    pub seed_hits: usize,
    pub total_land_seeds: usize,
    /// min(threshold, total_land_seeds)
    pub required_hits: usize,
    pub used_fallback: bool,
}

/// Pick the land mask to decompose.
///
/// The seed-confirmed mask is used unless it is empty or fewer than
/// `min(seed_hit_threshold, total land seeds)` land seeds landed in it, in
/// which case the broader candidate mask is returned.
pub fn choose_land_mask(
    segmentation: &Segmentation,
    mapper: &GridMapper,
    seeds: &[SeedPoint],
    seed_hit_threshold: usize,
) -> (CellMask, FallbackDecision) {
    let total_land_seeds = seeds.iter().filter(|s| s.kind == SeedKind::Land).count();
    let seed_hits = seed_cells(mapper, seeds, SeedKind::Land)
        .filter(|&idx| segmentation.confirmed_land.at(idx))
        .count();
    let required_hits = seed_hit_threshold.min(total_land_seeds);

    let used_fallback = segmentation.confirmed_land.is_empty() || seed_hits < required_hits;

    let decision = FallbackDecision {
        seed_hits,
        total_land_seeds,
        required_hits,
        used_fallback,
    };

    if used_fallback {
        log::warn!(
            "Seed fallback: {seed_hits}/{total_land_seeds} land seeds confirmed (need {required_hits}), using candidate land mask"
        );
        (segmentation.candidate_land.clone(), decision)
    } else {
        (segmentation.confirmed_land.clone(), decision)
    }
}
