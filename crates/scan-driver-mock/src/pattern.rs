//! Synthetic luminance planes for scripted frame delivery.

/// Uniform plane at the given brightness. Decodes to nothing.
pub fn solid(width: u32, height: u32, level: u8) -> Vec<u8> {
    vec![level; (width as usize) * (height as usize)]
}

/// Deterministic speckle with no symbol structure. Decodes to nothing.
pub fn speckle(width: u32, height: u32) -> Vec<u8> {
    (0..(width as u64) * (height as u64))
        .map(|i| ((i.wrapping_mul(2654435761)) >> 24) as u8)
        .collect()
}
