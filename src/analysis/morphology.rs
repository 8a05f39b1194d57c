use image::{GrayImage, Luma};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

use crate::models::BinaryMask;

/// Morphological opening with a `kernel` x `kernel` square.
///
/// Erosion keeps a pixel only if every neighbour under the element is
/// bright; dilation then grows survivors back with the reflected element.
/// Specks smaller than the element vanish, strands at least `kernel` wide
/// come back unchanged. Neighbours outside the image are ignored.
/// A kernel of 0 or 1 returns the mask untouched.
pub fn open(mask: &BinaryMask, kernel: u32) -> BinaryMask {
    if kernel <= 1 {
        return mask.clone();
    }

    // Kernel sizes are capped well below 255 by config validation
    let square = GrayImage::from_pixel(kernel, kernel, Luma([255]));
    let anchor = (kernel / 2) as u8;
    let far = (kernel - 1) as u8 - anchor;

    // Offsets -anchor..=far for erosion, -far..=anchor for dilation
    let element = Mask::from_image(&square, anchor, anchor);
    let reflected = Mask::from_image(&square, far, far);

    let eroded = grayscale_erode(mask.as_gray(), &element);
    BinaryMask::from_gray(&grayscale_dilate(&eroded, &reflected))
}
