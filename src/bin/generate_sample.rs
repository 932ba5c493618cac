use std::path::PathBuf;

use image::{Rgb, RgbImage};

/// Each class gets a base colour so a classifier has something to learn.
const CLASSES: [(&str, [f64; 3]); 3] = [
    ("red", [220.0, 40.0, 40.0]),
    ("green", [40.0, 200.0, 60.0]),
    ("blue", [40.0, 70.0, 220.0]),
];
const IMAGES_PER_CLASS: usize = 8;
const SIDE: u32 = 48;

/// Vertical brightness ramp over the class colour, plus per-pixel jitter.
fn generate_image(base: [f64; 3], seed: u64, amplitude: f64) -> RgbImage {
    RgbImage::from_fn(SIDE, SIDE, |x, y| {
        let ramp = 0.6 + 0.4 * (y as f64 / SIDE as f64);
        let jitter = amplitude * noise(seed, x, y);
        Rgb(base.map(|c| (c * ramp + jitter).clamp(0.0, 255.0) as u8))
    })
}

/// Deterministic noise in `[-1, 1)` from a splitmix64-style hash of the
/// seed and pixel coordinates.
fn noise(seed: u64, x: u32, y: u32) -> f64 {
    let mut h = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ ((u64::from(x) << 32) | u64::from(y));
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^= h >> 31;
    (h >> 11) as f64 / (1u64 << 52) as f64 - 1.0
}

fn main() -> anyhow::Result<()> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_images"));

    for (class_idx, (class, base)) in CLASSES.into_iter().enumerate() {
        let dir = root.join(class);
        std::fs::create_dir_all(&dir)?;
        for i in 0..IMAGES_PER_CLASS {
            let seed = (class_idx * IMAGES_PER_CLASS + i) as u64;
            let img = generate_image(base, seed, 12.0);
            img.save(dir.join(format!("{class}_{i:03}.jpg")))?;
        }
    }

    println!(
        "Wrote {} images ({}x{}) in {} classes to {}",
        CLASSES.len() * IMAGES_PER_CLASS,
        SIDE,
        SIDE,
        CLASSES.len(),
        root.display()
    );
    Ok(())
}
