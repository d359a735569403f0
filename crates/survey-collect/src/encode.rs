use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::try_join_all;
use survey_spec::{EncodedImages, ImageAttachments};

use crate::collaborators::ImageReader;
use crate::error::ImageEncodingError;

/// Reads and base64-encodes every attachment concurrently.
///
/// Resolves once all reads finished; the first failure aborts the whole batch.
pub async fn encode_images(
    reader: &dyn ImageReader,
    images: &ImageAttachments,
) -> Result<EncodedImages, ImageEncodingError> {
    let pending = images.iter().map(|(question_id, locator)| async move {
        let bytes = reader
            .read_image(locator)
            .await
            .map_err(|source| ImageEncodingError {
                question_id: *question_id,
                locator: locator.clone(),
                source,
            })?;
        tracing::debug!(question_id, bytes = bytes.len(), "image encoded");
        Ok::<_, ImageEncodingError>((*question_id, STANDARD.encode(bytes)))
    });

    let encoded = try_join_all(pending).await?;
    Ok(encoded.into_iter().collect())
}
