//! Choose which frames of a media file become samples.

use rand::Rng;

/// Picks `count` frame positions out of `frame_count`, ascending.
///
/// Media with fewer frames than requested gets evenly spaced positions
/// `floor(i * frame_count / count)`, which repeats frames by construction.
/// Otherwise `count` distinct frames are drawn uniformly and sorted.
pub fn select_positions<R: Rng + ?Sized>(frame_count: u64, count: usize, rng: &mut R) -> Vec<u64> {
    if frame_count == 0 || count == 0 {
        return Vec::new();
    }
    if frame_count < count as u64 {
        return (0..count as u64)
            .map(|i| ((i as u128 * frame_count as u128) / count as u128) as u64)
            .collect();
    }
    let mut picked: Vec<u64> = rand::seq::index::sample(rng, frame_count as usize, count)
        .into_iter()
        .map(|i| i as u64)
        .collect();
    picked.sort_unstable();
    picked
}
