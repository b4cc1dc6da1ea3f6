/// Camera demo: local segmentation + info overlay on captured frames
/// Runs YOLOv8n-seg over an image (or every frame image in a directory),
/// draws detection boxes or mask contours plus a static info card per object,
/// and writes the annotated frames out.
///
/// Usage: cargo run --release --bin lens_cam -- frame.png [--output dir] [--contour] [--threshold 0.35]

use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lens_server::core::config::Config;
use lens_server::services::rendering::LabelRenderer;
use lens_server::services::segmentation::{SegmentedObject, YoloSegService};
use lens_server::utils::draw::{draw_arrow, draw_mask_contour, draw_rect, fill_rect};

const BOX_COLOR: Rgba<u8> = Rgba([255, 200, 50, 255]);
const CONTOUR_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const PANEL_COLOR: Rgba<u8> = Rgba([40, 40, 40, 230]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MODE_COLOR: Rgba<u8> = Rgba([100, 255, 100, 255]);

const INFO_BOX_W: i32 = 240;
const INFO_BOX_H: i32 = 50;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("lens_server=info,ort=off")
        .init();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <frame.png|frames-dir> [--output dir] [--contour] [--threshold 0.35]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let mut output_dir = "outputs".to_string();
    let mut contour_mode = false;
    let mut threshold: Option<f32> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                if i + 1 < args.len() {
                    output_dir = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--contour" | "-c" => {
                contour_mode = true;
                i += 1;
            }
            "--threshold" | "-t" => {
                if i + 1 < args.len() {
                    threshold = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    std::fs::create_dir_all(&output_dir)?;

    // Initialize segmentation service
    println!("Initializing segmentation service...");
    let config = Config::new().expect("Failed to load config");
    let mut seg_config = config.segmentation.clone();
    if let Some(t) = threshold {
        seg_config.confidence_threshold = t;
    }
    let service = YoloSegService::new(Arc::new(seg_config))?;
    let renderer = LabelRenderer::new();
    println!("Backend: {}", service.device_type());

    let frames = collect_frames(&input_path)?;
    if frames.is_empty() {
        anyhow::bail!("No frame images found at {}", input_path.display());
    }

    let info_table = object_info_table();

    for frame_path in &frames {
        println!("Frame: {}", frame_path.display());
        let img = image::open(frame_path)
            .with_context(|| format!("Failed to load {}", frame_path.display()))?;

        let objects = service.segment(&img)?;
        let annotated = annotate_frame(&img, &objects, contour_mode, &info_table, &renderer);

        let stem = frame_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame");
        let out_path = Path::new(&output_dir).join(format!("{}_annotated.png", stem));
        DynamicImage::ImageRgba8(annotated).save(&out_path)?;
        println!(
            "  {} objects -> {}",
            objects.len(),
            out_path.display()
        );
    }

    Ok(())
}

/// A single image path, or every png/jpg directly inside a directory.
fn collect_frames(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut frames: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("Failed to read {}", input.display()))?
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()),
                Some(ref e) if e == "png" || e == "jpg" || e == "jpeg"
            )
        })
        .collect();
    frames.sort();
    Ok(frames)
}

/// Static info text per known class, mirroring the demo's lookup card.
fn object_info_table() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("person", "Humans are social beings with reasoning ability."),
        ("dog", "Dogs are domesticated mammals known for loyalty."),
        ("cat", "Cats are agile predators kept as companions."),
        ("bottle", "A bottle is a container for liquids."),
        ("cup", "A cup holds drinks and fits in one hand."),
        ("cell phone", "A mobile device for communication."),
        ("laptop", "Portable computer for work or study."),
        ("book", "Printed pages bound along one edge."),
        ("chair", "A seat with a back for one person."),
        ("potted plant", "A plant grown in a movable container."),
    ])
}

/// Draw boxes/contours, info cards, arrows, and the status lines onto a frame.
fn annotate_frame(
    img: &DynamicImage,
    objects: &[SegmentedObject],
    contour_mode: bool,
    info_table: &HashMap<&'static str, &'static str>,
    renderer: &LabelRenderer,
) -> RgbaImage {
    let mut frame = if contour_mode {
        // Desaturated base so the contours carry the detail
        DynamicImage::ImageLuma8(img.to_luma8()).to_rgba8()
    } else {
        img.to_rgba8()
    };

    for obj in objects {
        let [x1, y1, x2, y2] = obj.bbox;

        if contour_mode {
            draw_mask_contour(&mut frame, &obj.mask, x1, y1, CONTOUR_COLOR);
            draw_rect(&mut frame, x1, y1, x2, y2, 2, CONTOUR_COLOR);
        } else {
            draw_rect(&mut frame, x1, y1, x2, y2, 2, BOX_COLOR);
        }

        // Info card above the object
        let box_x = x1 - 10;
        let box_y = (y1 - 60).max(30);
        fill_rect(
            &mut frame,
            box_x,
            box_y,
            box_x + INFO_BOX_W,
            box_y + INFO_BOX_H,
            PANEL_COLOR,
        );
        draw_rect(
            &mut frame,
            box_x,
            box_y,
            box_x + INFO_BOX_W,
            box_y + INFO_BOX_H,
            2,
            BOX_COLOR,
        );

        let info_text = info_table.get(obj.label).copied().unwrap_or("No info available.");
        renderer.render_text(
            &mut frame,
            &title_case(obj.label),
            16.0,
            BOX_COLOR,
            box_x + 10,
            box_y + 5,
            Some(INFO_BOX_W as f32 - 20.0),
        );
        renderer.render_text(
            &mut frame,
            info_text,
            12.0,
            TEXT_COLOR,
            box_x + 10,
            box_y + 28,
            Some(INFO_BOX_W as f32 - 20.0),
        );

        // Arrow from the card down to the object center
        let center_x = (x1 + x2) / 2;
        let center_y = (y1 + y2) / 2;
        draw_arrow(
            &mut frame,
            box_x + INFO_BOX_W / 2,
            box_y + INFO_BOX_H,
            center_x,
            center_y,
            BOX_COLOR,
        );
    }

    // Status lines
    let status = if objects.is_empty() {
        "No objects detected".to_string()
    } else {
        let mut labels: Vec<&str> = Vec::new();
        for obj in objects {
            if !labels.contains(&obj.label) {
                labels.push(obj.label);
            }
        }
        let shown: Vec<&str> = labels.iter().take(3).copied().collect();
        let more = if objects.len() > 3 { "..." } else { "" };
        format!("Found: {}{}", shown.join(", "), more)
    };
    let mode_text = if contour_mode {
        "Mode: Info + Contour"
    } else {
        "Mode: Info + Normal"
    };

    renderer.render_text(&mut frame, &status, 20.0, TEXT_COLOR, 10, 10, None);
    renderer.render_text(&mut frame, mode_text, 16.0, MODE_COLOR, 10, 40, None);

    frame
}

fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
