//! Wire format posted by the object detector
//!
//! The detector flattens everything into one-dimensional arrays: four
//! integers per bounding box, the mask polygons back to back with one
//! length per mask, one PCA angle and one class name per detection.
//! Any array may be missing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::Result;
use crate::detection::frame::{Detection, DetectionFrame};

/// Raw detection payload as received from the detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionPayload {
    #[serde(default)]
    pub max_width: i32,
    #[serde(default)]
    pub max_height: i32,
    #[serde(default)]
    pub bboxes: Option<Vec<i32>>,
    #[serde(default)]
    pub masks: Option<Vec<i32>>,
    #[serde(default)]
    pub mask_lengths: Option<Vec<i32>>,
    #[serde(default)]
    pub angles: Option<Vec<i32>>,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

/// Why a payload cannot be used this tick
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadDefect {
    #[error("payload contains no data")]
    MissingArrays,

    #[error("payload is empty")]
    Empty,

    #[error("{bboxes} bbox values for {mask_lengths} masks (expected 4 per mask)")]
    BboxCountMismatch { bboxes: usize, mask_lengths: usize },

    #[error("mismatched lengths: {mask_lengths} masks, {angles} angles, {names} names")]
    LengthMismatch {
        mask_lengths: usize,
        angles: usize,
        names: usize,
    },

    #[error("image size {width}x{height} is not positive")]
    InvalidImageSize { width: i32, height: i32 },
}

impl DetectionPayload {
    /// Decode a JSON request body
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Validity check applied before a payload is used
    pub fn check(&self) -> std::result::Result<(), PayloadDefect> {
        let (Some(bboxes), Some(_), Some(mask_lengths), Some(angles), Some(names)) = (
            &self.bboxes,
            &self.masks,
            &self.mask_lengths,
            &self.angles,
            &self.names,
        ) else {
            return Err(PayloadDefect::MissingArrays);
        };

        if bboxes.len() < 4 || angles.is_empty() || names.is_empty() {
            return Err(PayloadDefect::Empty);
        }

        if bboxes.len() != 4 * mask_lengths.len() {
            return Err(PayloadDefect::BboxCountMismatch {
                bboxes: bboxes.len(),
                mask_lengths: mask_lengths.len(),
            });
        }

        if mask_lengths.len() != angles.len() || angles.len() != names.len() {
            return Err(PayloadDefect::LengthMismatch {
                mask_lengths: mask_lengths.len(),
                angles: angles.len(),
                names: names.len(),
            });
        }

        if self.max_width <= 0 || self.max_height <= 0 {
            return Err(PayloadDefect::InvalidImageSize {
                width: self.max_width,
                height: self.max_height,
            });
        }

        Ok(())
    }

    /// Convert into a frame, or `None` if the payload is unusable
    pub fn to_frame(&self) -> Option<DetectionFrame> {
        if let Err(defect) = self.check() {
            tracing::debug!("Ignoring detection payload: {}", defect);
            return None;
        }

        let bboxes = self.bboxes.as_deref()?;
        let names = self.names.as_deref()?;
        let angles = self.angles.as_deref()?;

        let detections = names
            .iter()
            .zip(angles)
            .zip(bboxes.chunks_exact(4))
            .map(|((label, &angle), bbox)| Detection {
                label: label.clone(),
                bbox: [bbox[0], bbox[1], bbox[2], bbox[3]],
                angle_deg: angle,
            })
            .collect();

        Some(DetectionFrame {
            image_width: self.max_width as u32,
            image_height: self.max_height as u32,
            detections,
        })
    }
}
