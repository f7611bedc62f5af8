//! JSON bodies exchanged with the inference service.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use serde::Deserialize;

use super::PredictError;
use crate::session::PredictionResult;

#[derive(Debug, Deserialize)]
struct PredictionWire {
    #[serde(rename = "Prediction")]
    prediction: String,
    #[serde(rename = "Inference")]
    inference: String,
    #[serde(rename = "Boundaries")]
    boundaries: String,
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    error: String,
}

/// Decode a 200 body into a prediction with both overlays decoded.
pub(crate) fn decode_prediction(body: &[u8]) -> Result<PredictionResult, PredictError> {
    let wire: PredictionWire = serde_json::from_slice(body)
        .map_err(|err| PredictError::InvalidResponse(format!("JSON: {err}")))?;
    Ok(PredictionResult {
        label: wire.prediction,
        inference_image: decode_image("Inference", &wire.inference)?,
        boundaries_image: decode_image("Boundaries", &wire.boundaries)?,
    })
}

/// Pull the message out of a 400 body, falling back to the raw text.
pub(crate) fn decode_validation_message(body: &[u8]) -> String {
    if let Ok(wire) = serde_json::from_slice::<ErrorWire>(body) {
        return wire.error;
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        "The backend rejected the image".to_string()
    } else {
        text
    }
}

fn decode_image(field: &str, encoded: &str) -> Result<RgbaImage, PredictError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|err| PredictError::InvalidResponse(format!("{field} is not base64: {err}")))?;
    let image = image::load_from_memory(&bytes).map_err(|err| {
        PredictError::InvalidResponse(format!("{field} is not a readable image: {err}"))
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> String {
    use std::io::Cursor;
    let image = RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    STANDARD.encode(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_label_and_both_images() {
        let body = format!(
            r#"{{"Prediction": "glioma", "Inference": "{}", "Boundaries": "{}"}}"#,
            encode_png(3, 2),
            encode_png(5, 4)
        );
        let result = decode_prediction(body.as_bytes()).unwrap();
        assert_eq!(result.label, "glioma");
        assert_eq!(result.inference_image.dimensions(), (3, 2));
        assert_eq!(result.boundaries_image.dimensions(), (5, 4));
    }

    #[test]
    fn bad_base64_names_the_field() {
        let body = format!(
            r#"{{"Prediction": "glioma", "Inference": "{}", "Boundaries": "%%%"}}"#,
            encode_png(1, 1)
        );
        let err = decode_prediction(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidResponse(ref msg) if msg.contains("Boundaries")));
    }

    #[test]
    fn base64_of_non_image_is_rejected() {
        let junk = STANDARD.encode(b"plain text");
        let body = format!(
            r#"{{"Prediction": "glioma", "Inference": "{junk}", "Boundaries": "{junk}"}}"#
        );
        let err = decode_prediction(body.as_bytes()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidResponse(ref msg) if msg.contains("Inference")));
    }

    #[test]
    fn missing_fields_are_invalid() {
        let err = decode_prediction(br#"{"Prediction": "glioma"}"#).unwrap_err();
        assert!(matches!(err, PredictError::InvalidResponse(_)));
    }

    #[test]
    fn validation_message_prefers_error_field() {
        assert_eq!(
            decode_validation_message(br#"{"error": "Image is not a brain MRI"}"#),
            "Image is not a brain MRI"
        );
        assert_eq!(decode_validation_message(b"  plain reason "), "plain reason");
        assert_eq!(
            decode_validation_message(b""),
            "The backend rejected the image"
        );
    }
}
