//! Validated detection frames and their mapping onto the world plane

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::config::WorldMapping;

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detector class name
    pub label: String,
    /// `[x_min, y_min, x_max, y_max]` in pixels, origin top-left
    pub bbox: [i32; 4],
    /// Orientation of the object's mask (degrees)
    #[serde(default)]
    pub angle_deg: i32,
}

impl Detection {
    /// Bounding-box centre in pixels
    ///
    /// Corners are summed in `i64` so any `i32` box is accepted.
    pub fn pixel_center(&self) -> Vec2 {
        let [x_min, y_min, x_max, y_max] = self.bbox.map(i64::from);
        Vec2::new(
            (x_min + x_max) as f32 / 2.0,
            (y_min + y_max) as f32 / 2.0,
        )
    }
}

/// One batch of detections for a single camera image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub image_width: u32,
    pub image_height: u32,
    pub detections: Vec<Detection>,
}

impl DetectionFrame {
    /// Bounding-box centre scaled into the unit square, origin top-left
    pub fn normalised_center(&self, detection: &Detection) -> Vec2 {
        let center = detection.pixel_center();
        Vec2::new(
            center.x / self.image_width as f32,
            center.y / self.image_height as f32,
        )
    }

    /// World position of a detection's marker
    pub fn world_position(&self, detection: &Detection, mapping: &WorldMapping) -> Vec3 {
        mapping.to_world(self.normalised_center(detection))
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bbox: [i32; 4], width: u32, height: u32) -> DetectionFrame {
        DetectionFrame {
            image_width: width,
            image_height: height,
            detections: vec![Detection {
                label: "red".into(),
                bbox,
                angle_deg: 0,
            }],
        }
    }

    #[test]
    fn test_bbox_center_normalised_and_mapped() {
        let f = frame([0, 0, 100, 100], 200, 200);
        let d = &f.detections[0];
        assert_eq!(d.pixel_center(), Vec2::new(50.0, 50.0));
        assert_eq!(f.normalised_center(d), Vec2::new(0.25, 0.25));

        let world = f.world_position(d, &WorldMapping::default());
        assert!((world.x - -2.5).abs() < 1e-6);
        assert!((world.z - 2.5).abs() < 1e-6);
        assert!((world.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_odd_pixel_sum_keeps_half() {
        let f = frame([0, 0, 101, 1], 202, 2);
        let d = &f.detections[0];
        assert_eq!(d.pixel_center(), Vec2::new(50.5, 0.5));
        assert_eq!(f.normalised_center(d), Vec2::new(0.25, 0.25));
    }

    #[test]
    fn test_extreme_bbox_does_not_overflow() {
        let f = frame([i32::MAX - 1, i32::MIN, i32::MAX, i32::MIN + 10], 640, 480);
        let center = f.detections[0].pixel_center();
        assert!(center.is_finite());
        assert!(center.x > 2.0e9);
        assert!(center.y < -2.0e9);
    }

    #[test]
    fn test_bottom_right_maps_to_far_corner() {
        let f = frame([600, 440, 640, 480], 640, 480);
        let world = f.world_position(&f.detections[0], &WorldMapping::default());
        assert!(world.x > 4.5);
        assert!(world.z < -4.5);
    }
}
