#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WordCloudError {
    #[error("no words left to lay out after filtering")]
    EmptyVocabulary,
    #[error("mask is {mask_width}x{mask_height} but the color image is {image_width}x{image_height}")]
    DimensionMismatch {
        mask_width: u32,
        mask_height: u32,
        image_width: u32,
        image_height: u32,
    },
}
