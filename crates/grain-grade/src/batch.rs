use grain_core::config::BatchScheme;

/// Batch that the `image_index`-th image (0-based) of a sample belongs to.
pub fn batch_index(image_index: usize, batch_size: usize, scheme: BatchScheme) -> usize {
    let size = batch_size.max(1);
    match scheme {
        BatchScheme::Interleaved => image_index % size,
        BatchScheme::Contiguous => image_index / size,
    }
}

/// Number of batches a sample with `image_count` images is divided into.
///
/// Interleaved batching always yields `batch_size` batches, some possibly
/// empty; contiguous batching yields one batch per started group.
pub fn batch_count(image_count: usize, batch_size: usize, scheme: BatchScheme) -> usize {
    let size = batch_size.max(1);
    match scheme {
        BatchScheme::Interleaved => size,
        BatchScheme::Contiguous => image_count.div_ceil(size).max(1),
    }
}
