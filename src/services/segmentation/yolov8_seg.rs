// YOLOv8n-seg segmentation service for the camera demo
// Single-model pipeline: letterboxed frame in, boxes + class labels + binary
// masks out. Prediction tensor is [1, 116, 8400] (4 box + 80 classes + 32 mask
// coefficients per anchor), prototype masks are [1, 32, 160, 160].

use image::{DynamicImage, GrayImage, Luma};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::SegmentationConfig;
use crate::core::errors::{SegmentationError, SegmentationResult};
use crate::services::segmentation::coco::COCO_CLASSES;

const NUM_CLASSES: usize = 80;
const NUM_MASK_COEFFS: usize = 32;
const PROTO_SIZE: usize = 160;
const MASK_THRESHOLD: f32 = 0.5;

/// One segmented object in original-frame coordinates.
#[derive(Debug, Clone)]
pub struct SegmentedObject {
    pub class_id: usize,
    pub label: &'static str,
    pub score: f32,
    /// x1, y1, x2, y2 in the original frame
    pub bbox: [i32; 4],
    /// Binary mask sized to the bbox (255 = object)
    pub mask: GrayImage,
}

/// Letterbox geometry mapping the original frame into the model input square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    /// Geometry for fitting `width`x`height` into a `target` square with
    /// aspect-preserving scale and centered padding.
    pub fn fit(width: u32, height: u32, target: u32) -> Self {
        let scale = (target as f32 / width as f32).min(target as f32 / height as f32);
        let new_w = (width as f32 * scale).round();
        let new_h = (height as f32 * scale).round();
        Self {
            scale,
            pad_x: ((target as f32 - new_w) / 2.0).floor(),
            pad_y: ((target as f32 - new_h) / 2.0).floor(),
            orig_width: width,
            orig_height: height,
        }
    }

    /// Map a letterbox-space coordinate back to the original frame.
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_width as f32 - 1.0),
            ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_height as f32 - 1.0),
        )
    }

    /// Map an original-frame coordinate into letterbox space.
    pub fn to_letterbox(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.pad_x, y * self.scale + self.pad_y)
    }
}

/// YOLOv8n-seg ONNX service
pub struct YoloSegService {
    session: Mutex<Session>,
    config: Arc<SegmentationConfig>,
    device_type: String,
}

impl YoloSegService {
    /// Load the model from the configured path and build an inference session.
    pub fn new(config: Arc<SegmentationConfig>) -> SegmentationResult<Self> {
        let model_bytes =
            std::fs::read(&config.model_path).map_err(|e| SegmentationError::ModelLoadFailed {
                path: config.model_path.clone(),
                source: e,
            })?;

        info!(
            "Loading segmentation model ({:.1} MB) from {}",
            model_bytes.len() as f64 / 1_048_576.0,
            config.model_path
        );

        let (device_type, session) = build_session(&model_bytes)?;
        info!("✓ Segmentation: {} ({}x{} input)", device_type, config.target_size, config.target_size);

        Ok(Self {
            session: Mutex::new(session),
            config,
            device_type,
        })
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    /// Run segmentation on one frame. Returns objects above the confidence
    /// threshold after class-wise NMS, with masks in bbox-local coordinates.
    pub fn segment(&self, img: &DynamicImage) -> SegmentationResult<Vec<SegmentedObject>> {
        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(SegmentationError::InvalidImageSize { width, height });
        }

        let target = self.config.target_size;
        let letterbox = Letterbox::fit(width, height, target);
        let input = self.preprocess(img, letterbox, target);

        let input_value = Value::from_array(input)?;

        let (pred_shape, pred_data, proto_shape, proto_data) = {
            let mut session = self.session.lock();
            let outputs = session.run(ort::inputs!["images" => input_value])?;

            let (pred_shape, pred_data) = outputs["output0"].try_extract_tensor::<f32>()?;
            let pred_shape_owned: Vec<i64> = pred_shape.to_vec();
            let pred_data_owned = pred_data.to_vec();

            let (proto_shape, proto_data) = outputs["output1"].try_extract_tensor::<f32>()?;
            let proto_shape_owned: Vec<i64> = proto_shape.to_vec();
            let proto_data_owned = proto_data.to_vec();

            (
                pred_shape_owned,
                pred_data_owned,
                proto_shape_owned,
                proto_data_owned,
            )
        };

        if pred_shape.len() != 3 || pred_shape[1] as usize != 4 + NUM_CLASSES + NUM_MASK_COEFFS {
            return Err(SegmentationError::InvalidModelOutput(format!(
                "expected [1, {}, N] prediction tensor, got {:?}",
                4 + NUM_CLASSES + NUM_MASK_COEFFS,
                pred_shape
            )));
        }
        if proto_shape.len() != 4
            || proto_shape[1] as usize != NUM_MASK_COEFFS
            || proto_shape[2] as usize != PROTO_SIZE
            || proto_shape[3] as usize != PROTO_SIZE
        {
            return Err(SegmentationError::InvalidModelOutput(format!(
                "expected [1, {}, {}, {}] prototype tensor, got {:?}",
                NUM_MASK_COEFFS, PROTO_SIZE, PROTO_SIZE, proto_shape
            )));
        }

        let num_anchors = pred_shape[2] as usize;
        let candidates = self.decode_candidates(&pred_data, num_anchors, letterbox);
        let kept = nms(candidates, self.config.iou_threshold);

        debug!("Segmentation: {} objects kept after NMS", kept.len());

        let objects = kept
            .into_iter()
            .map(|c| {
                let mask = self.build_mask(&c, &proto_data, letterbox, target);
                SegmentedObject {
                    class_id: c.class_id,
                    label: COCO_CLASSES[c.class_id],
                    score: c.score,
                    bbox: [
                        c.bbox[0] as i32,
                        c.bbox[1] as i32,
                        c.bbox[2] as i32,
                        c.bbox[3] as i32,
                    ],
                    mask,
                }
            })
            .collect();

        Ok(objects)
    }

    fn preprocess(&self, img: &DynamicImage, letterbox: Letterbox, target: u32) -> Array4<f32> {
        let new_w = (letterbox.orig_width as f32 * letterbox.scale).round() as u32;
        let new_h = (letterbox.orig_height as f32 * letterbox.scale).round() as u32;
        let resized = img
            .resize_exact(new_w.max(1), new_h.max(1), image::imageops::FilterType::Triangle)
            .to_rgb8();

        let target = target as usize;
        // Letterbox padding value 114/255, the YOLO convention
        let mut array = Array4::<f32>::from_elem((1, 3, target, target), 114.0 / 255.0);

        let dx = letterbox.pad_x as usize;
        let dy = letterbox.pad_y as usize;
        for (x, y, pixel) in resized.enumerate_pixels() {
            let tx = x as usize + dx;
            let ty = y as usize + dy;
            if tx < target && ty < target {
                array[[0, 0, ty, tx]] = pixel[0] as f32 / 255.0;
                array[[0, 1, ty, tx]] = pixel[1] as f32 / 255.0;
                array[[0, 2, ty, tx]] = pixel[2] as f32 / 255.0;
            }
        }

        array
    }

    /// Decode raw predictions into thresholded candidates in original-frame
    /// coordinates. The tensor layout is attribute-major: value for attribute
    /// `a` of anchor `n` lives at `a * num_anchors + n`.
    fn decode_candidates(
        &self,
        pred: &[f32],
        num_anchors: usize,
        letterbox: Letterbox,
    ) -> Vec<Candidate> {
        let at = |attr: usize, anchor: usize| pred[attr * num_anchors + anchor];
        let mut candidates = Vec::new();

        for anchor in 0..num_anchors {
            let mut best_class = 0usize;
            let mut best_score = 0f32;
            for class in 0..NUM_CLASSES {
                let score = at(4 + class, anchor);
                if score > best_score {
                    best_score = score;
                    best_class = class;
                }
            }

            if best_score < self.config.confidence_threshold {
                continue;
            }

            let cx = at(0, anchor);
            let cy = at(1, anchor);
            let w = at(2, anchor);
            let h = at(3, anchor);

            let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
            let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);
            if x2 <= x1 || y2 <= y1 {
                continue;
            }

            let mut coeffs = [0f32; NUM_MASK_COEFFS];
            for (k, coeff) in coeffs.iter_mut().enumerate() {
                *coeff = at(4 + NUM_CLASSES + k, anchor);
            }

            candidates.push(Candidate {
                class_id: best_class,
                score: best_score,
                bbox: [x1, y1, x2, y2],
                coeffs,
            });
        }

        candidates
    }

    /// Assemble the binary mask for one detection by combining its mask
    /// coefficients with the prototype masks, sampled per bbox pixel.
    fn build_mask(
        &self,
        candidate: &Candidate,
        proto: &[f32],
        letterbox: Letterbox,
        target: u32,
    ) -> GrayImage {
        let [x1, y1, x2, y2] = candidate.bbox;
        let mask_w = (x2 - x1).max(1.0) as u32;
        let mask_h = (y2 - y1).max(1.0) as u32;
        // Prototype grid is the letterbox square downsampled by this factor
        let proto_stride = target as f32 / PROTO_SIZE as f32;

        let mut mask = GrayImage::new(mask_w, mask_h);
        for my in 0..mask_h {
            for mx in 0..mask_w {
                let (lx, ly) = letterbox.to_letterbox(x1 + mx as f32, y1 + my as f32);
                let px = ((lx / proto_stride) as usize).min(PROTO_SIZE - 1);
                let py = ((ly / proto_stride) as usize).min(PROTO_SIZE - 1);

                let mut logit = 0f32;
                for (k, coeff) in candidate.coeffs.iter().enumerate() {
                    logit += coeff * proto[(k * PROTO_SIZE + py) * PROTO_SIZE + px];
                }

                let value = 1.0 / (1.0 + (-logit).exp());
                if value > MASK_THRESHOLD {
                    mask.put_pixel(mx, my, Luma([255]));
                }
            }
        }

        mask
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    class_id: usize,
    score: f32,
    bbox: [f32; 4],
    coeffs: [f32; NUM_MASK_COEFFS],
}

/// Intersection-over-union of two xyxy boxes.
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    if inter <= 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Class-wise non-maximum suppression, highest score first.
fn nms(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && iou(&k.bbox, &candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Build an ONNX Runtime session for the segmentation model.
///
/// `INFERENCE_BACKEND=cpu` forces the CPU provider explicitly; anything else
/// falls through to the same CPU default, logged so a misconfigured value is
/// visible.
fn build_session(model_bytes: &[u8]) -> SegmentationResult<(String, Session)> {
    if let Ok(forced) = std::env::var("INFERENCE_BACKEND") {
        let forced = forced.trim().to_lowercase();
        if !forced.is_empty() && forced != "auto" && forced != "cpu" {
            warn!("Unknown INFERENCE_BACKEND '{}', using CPU", forced);
        }
    }

    let session = Session::builder()?
        .with_execution_providers([CPUExecutionProvider::default().build()])?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(num_cpus::get().max(1))?
        .with_inter_threads(1)?
        .commit_from_memory(model_bytes)?;

    Ok(("CPU".to_string(), session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_landscape() {
        let lb = Letterbox::fit(1280, 720, 640);
        assert!((lb.scale - 0.5).abs() < 1e-6);
        assert_eq!(lb.pad_x, 0.0);
        assert_eq!(lb.pad_y, 140.0);
    }

    #[test]
    fn test_letterbox_roundtrip() {
        let lb = Letterbox::fit(1920, 1080, 640);
        let (lx, ly) = lb.to_letterbox(960.0, 540.0);
        let (ox, oy) = lb.to_original(lx, ly);
        assert!((ox - 960.0).abs() < 1.0);
        assert!((oy - 540.0).abs() < 1.0);
    }

    #[test]
    fn test_letterbox_clamps_padding_region() {
        let lb = Letterbox::fit(640, 360, 640);
        // A point inside the top padding band maps onto the frame edge.
        let (_, oy) = lb.to_original(320.0, 0.0);
        assert_eq!(oy, 0.0);
    }

    fn candidate(class_id: usize, score: f32, bbox: [f32; 4]) -> Candidate {
        Candidate {
            class_id,
            score,
            bbox,
            coeffs: [0.0; NUM_MASK_COEFFS],
        }
    }

    #[test]
    fn test_iou_disjoint_and_identical() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert_eq!(iou(&a, &b), 0.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_overlapping_same_class() {
        let kept = nms(
            vec![
                candidate(0, 0.9, [0.0, 0.0, 10.0, 10.0]),
                candidate(0, 0.8, [1.0, 1.0, 11.0, 11.0]),
                candidate(0, 0.7, [50.0, 50.0, 60.0, 60.0]),
            ],
            0.45,
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].bbox, [50.0, 50.0, 60.0, 60.0]);
    }

    #[test]
    fn test_nms_keeps_overlapping_different_classes() {
        let kept = nms(
            vec![
                candidate(0, 0.9, [0.0, 0.0, 10.0, 10.0]),
                candidate(1, 0.8, [1.0, 1.0, 11.0, 11.0]),
            ],
            0.45,
        );
        assert_eq!(kept.len(), 2);
    }
}
