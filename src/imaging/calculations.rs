//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the output height for a fixed target width.
///
/// The height follows the *original* aspect ratio and is rounded to the
/// nearest pixel (halves round up). Never returns less than 1.
///
/// # Arguments
/// * `original` - Original image dimensions (width, height)
/// * `target_width` - Desired output width in pixels
///
/// # Returns
/// * Output height in pixels
///
/// # Examples
/// ```
/// # use summit_upload::imaging::calculate_height_for_width;
/// // 3200x1800 → 1600 wide is exactly 900 tall
/// assert_eq!(calculate_height_for_width((3200, 1800), 1600), 900);
///
/// // 75 * 1800 / 3200 = 42.19 → 42
/// assert_eq!(calculate_height_for_width((3200, 1800), 75), 42);
/// ```
pub fn calculate_height_for_width(original: (u32, u32), target_width: u32) -> u32 {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return 1;
    }

    // Integer math in u64 avoids float drift on large images.
    let numerator = target_width as u64 * orig_h as u64 + orig_w as u64 / 2;
    let height = numerator / orig_w as u64;

    height.clamp(1, u32::MAX as u64) as u32
}

/// Calculate the full output dimensions for a target width.
pub fn calculate_scaled_dimensions(original: (u32, u32), target_width: u32) -> (u32, u32) {
    (
        target_width,
        calculate_height_for_width(original, target_width),
    )
}
