//! Color palette construction for indexed voxel formats.
//!
//! Up to 255 distinct colors are used as-is. Larger color sets are reduced
//! with median cut: the bucket with the widest channel range is repeatedly
//! split at the count-weighted median of that channel, and each final bucket
//! is represented by its count-weighted average color.
//!
//! Indices are 1-based; index 0 means "empty" in `.vox` files.

use std::collections::HashMap;

/// Maximum number of palette entries (index 0 is reserved).
pub const MAX_PALETTE_COLORS: usize = 255;

/// Pack an RGB triple into a single key (`0xRRGGBB`).
pub fn pack_rgb(rgb: [u8; 3]) -> u32 {
    (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32
}

/// A quantized palette plus the mapping from original colors to entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
    mapping: HashMap<[u8; 3], u8>,
}

impl Palette {
    /// Palette colors; entry `i` has index `i + 1`.
    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// 1-based palette index of an original color, or None if the color was
    /// not part of the input set.
    pub fn index_of(&self, rgb: [u8; 3]) -> Option<u8> {
        self.mapping.get(&rgb).copied()
    }

    /// Palette entries as opaque RGBA.
    pub fn to_rgba(&self) -> Vec<[u8; 4]> {
        self.colors.iter().map(|c| [c[0], c[1], c[2], 255]).collect()
    }
}

#[derive(Clone, Copy, Debug)]
struct ColorEntry {
    rgb: [u8; 3],
    count: usize,
}

/// Per-channel (max - min) over a non-empty bucket.
fn channel_ranges(entries: &[ColorEntry]) -> [u8; 3] {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for e in entries {
        for c in 0..3 {
            lo[c] = lo[c].min(e.rgb[c]);
            hi[c] = hi[c].max(e.rgb[c]);
        }
    }
    [
        hi[0].saturating_sub(lo[0]),
        hi[1].saturating_sub(lo[1]),
        hi[2].saturating_sub(lo[2]),
    ]
}

/// Channel with the widest range; R wins over G over B on ties.
fn longest_axis(entries: &[ColorEntry]) -> usize {
    let [r, g, b] = channel_ranges(entries);
    if r >= g && r >= b {
        0
    } else if g >= b {
        1
    } else {
        2
    }
}

/// Split a bucket at the count-weighted median of its longest axis.
///
/// Both halves are guaranteed non-empty; the bucket must hold at least two
/// entries.
fn split_bucket(mut entries: Vec<ColorEntry>) -> (Vec<ColorEntry>, Vec<ColorEntry>) {
    let axis = longest_axis(&entries);
    entries.sort_by_key(|e| e.rgb[axis]);

    let half = entries.iter().map(|e| e.count).sum::<usize>() / 2;
    let mut cumulative = 0;
    let mut split = entries.len() / 2;
    for (i, e) in entries.iter().enumerate() {
        cumulative += e.count;
        if cumulative >= half {
            split = i + 1;
            break;
        }
    }
    let split = split.clamp(1, entries.len() - 1);

    let right = entries.split_off(split);
    (entries, right)
}

/// Count-weighted average color (integer division).
fn average(entries: &[ColorEntry]) -> [u8; 3] {
    let mut sum = [0usize; 3];
    let mut total = 0usize;
    for e in entries {
        for c in 0..3 {
            sum[c] += e.rgb[c] as usize * e.count;
        }
        total += e.count;
    }
    let total = total.max(1);
    [
        (sum[0] / total) as u8,
        (sum[1] / total) as u8,
        (sum[2] / total) as u8,
    ]
}

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> i32 {
    let dr = a[0] as i32 - b[0] as i32;
    let dg = a[1] as i32 - b[1] as i32;
    let db = a[2] as i32 - b[2] as i32;
    dr * dr + dg * dg + db * db
}

/// 1-based index of the nearest palette entry (lowest index on ties).
fn nearest_index(rgb: [u8; 3], colors: &[[u8; 3]]) -> u8 {
    let mut best = 0;
    let mut best_dist = i32::MAX;
    for (i, &c) in colors.iter().enumerate() {
        let d = distance_sq(rgb, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    (best + 1) as u8
}

/// Build a palette of at most [`MAX_PALETTE_COLORS`] entries from color
/// frequencies.
pub fn build_palette(frequencies: &HashMap<[u8; 3], usize>) -> Palette {
    // Fixed input order keeps the result independent of HashMap iteration.
    let mut entries: Vec<ColorEntry> = frequencies
        .iter()
        .map(|(&rgb, &count)| ColorEntry { rgb, count })
        .collect();
    entries.sort_by_key(|e| pack_rgb(e.rgb));

    if entries.len() <= MAX_PALETTE_COLORS {
        let colors: Vec<[u8; 3]> = entries.iter().map(|e| e.rgb).collect();
        let mapping = colors
            .iter()
            .enumerate()
            .map(|(i, &rgb)| (rgb, (i + 1) as u8))
            .collect();
        return Palette { colors, mapping };
    }

    let mut buckets: Vec<Vec<ColorEntry>> = vec![entries];
    while buckets.len() < MAX_PALETTE_COLORS {
        let mut best: Option<(usize, u8)> = None;
        for (i, bucket) in buckets.iter().enumerate() {
            if bucket.len() <= 1 {
                continue;
            }
            let widest = channel_ranges(bucket).into_iter().max().unwrap_or(0);
            if widest > best.map_or(0, |(_, range)| range) {
                best = Some((i, widest));
            }
        }
        let Some((index, _)) = best else {
            break;
        };

        let bucket = std::mem::take(&mut buckets[index]);
        let (left, right) = split_bucket(bucket);
        buckets[index] = left;
        buckets.push(right);
    }

    let colors: Vec<[u8; 3]> = buckets.iter().map(|b| average(b)).collect();
    let mapping = frequencies
        .keys()
        .map(|&rgb| (rgb, nearest_index(rgb, &colors)))
        .collect();

    Palette { colors, mapping }
}
