pub mod coco;
pub mod yolov8_seg;

pub use coco::COCO_CLASSES;
pub use yolov8_seg::{Letterbox, SegmentedObject, YoloSegService};
