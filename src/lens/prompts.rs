//! System prompts, templates, and few-shot examples for every lens.
//!
//! Centralizing these strings keeps lens behavior a one-place change: adding
//! a lens means adding its block here and a row to the table in `lens`.
//! Templates use `{object}` and `{image_url}` placeholders filled by
//! `build_prompt`.

// -------------------- FACTS-PHASE SYSTEM PROMPTS --------------------

pub const MATH_SYSTEM: &str = "You are a mathematics lens assistant. Explain the object's \
     measurable geometry, dimensions, and related equations such as area, volume, or perimeter.";

pub const PHYSICS_SYSTEM: &str = "You are a physics lens assistant. Describe the object's \
     physical properties such as motion, energy, or forces, and include relevant equations \
     like F = ma or E = mc^2.";

pub const BIOLOGY_SYSTEM: &str = "You are a biology lens assistant. Describe the organism or \
     biological function of the object, its anatomy or role in living systems, and include a \
     relevant quantitative relation such as surface-area-to-volume ratio or growth rate.";

pub const ART_SYSTEM: &str = "You are an art lens assistant. Describe the object's composition, \
     proportion, and color relationships, and include a relevant compositional relation such \
     as the golden ratio or rule-of-thirds placement.";

pub const ECO_SYSTEM: &str = "You are an ecology lens assistant. Describe the object's \
     environmental footprint, material life cycle, or energy use, and include a relevant \
     quantitative relation such as embodied energy or recycling rate.";

pub const CULTURE_SYSTEM: &str = "You are a cultural lens assistant. Describe the object's \
     historical origin, cultural significance, or evolution over time, and include one \
     concrete dated fact or span.";

// -------------------- FACTS-PHASE TEMPLATES --------------------

pub const MATH_TEMPLATE: &str = "\
You are generating structured data for a mathematical lens AI that will create holographic,
blueprint-style skeleton diagrams of real-world objects.

Given the following information:
Object: {object}
Image (optional): {image_url}

Return a JSON object with exactly four keys:
1. \"object\" - the object's name.
2. \"equation\" - the most relevant mathematical formula describing its measurable property
   (area, volume, surface, or geometric dimension).
3. \"explanation\" - a short explanation of what the formula means and what each variable represents.
4. \"guide\" - a complete, detailed rendering prompt describing how to visualize the object
   as a neon-blueprint mathematical schematic.

In \"guide\", describe:
- The subject, referring directly to the object: e.g. \"A laptop\", \"A cup\", \"A bottle\".
- The style: glowing neon (electric cyan or blue) on a pure black background.
- The geometry focus: how to depict its measurable geometry (length, width, radius, height)
  and its key equation.
- The mathematical annotation: label variables such as r, h, w, L, A, V as appropriate.
- The composition: the view (front, side, top, or isometric) that best shows the measurable
  dimensions.
- The objective: the final output should look like a technical or mathematical wireframe,
  NOT a photo or realistic rendering.
";

pub const MATH_EXAMPLE: &str = "\
Example output:
{
  \"object\": \"bottle\",
  \"equation\": \"V = pi*r^2*h\",
  \"explanation\": \"Volume of a cylinder where r is radius and h is height.\",
  \"guide\": \"Create a highly detailed, neon-blueprint rendering of a cylindrical bottle with a transparent body. Use glowing cyan lines on a pure black background. Label radius r at the top and height h along the vertical axis. Add the formula V = pi*r^2*h in bright blue text below. Include faint dashed lines showing the circular base area.\"
}
";

pub const PHYSICS_TEMPLATE: &str = "\
Given the following information:

Object: {object}
Image (optional): {image_url}

Return a JSON output with exactly four keys:
1. \"object\" - repeat the object's name.
2. \"equation\" - the most relevant PHYSICS equation describing how the object behaves or
   interacts (Newton's laws, energy, motion, force, pressure).
3. \"explanation\" - a short explanation of what the equation means and how it relates to
   the object.
4. \"guide\" - a detailed, visual step-by-step instruction for overlaying AR annotations
   on the photo.

In \"guide\", include these details clearly:
- The object's physical context (motion, orientation, forces, or energy aspects).
- Physical parameters or variables to label (F, m, a, v, E, P).
- How to visualize vectors, arrows, or fields (direction of force, gravity, velocity).
- The color and style for each overlay (e.g. red arrows for forces, blue text for equations).
- Where to place the main equation (above or beside the object) and how to align the arrows
  or labels.
- Emphasize: keep the real image visible - no redrawing, no object replacement.
- Style: AR physics overlay on a real-world photo, visually clear and conceptually accurate.
";

pub const PHYSICS_EXAMPLE: &str = "\
Example output:
{
  \"object\": \"ball\",
  \"equation\": \"F = m*a\",
  \"explanation\": \"Newton's Second Law - the force on an object equals its mass times its acceleration.\",
  \"guide\": \"Show a glowing red arrow in the direction of the ball's motion to represent the force F. Label 'm' near the ball to indicate its mass, and draw a smaller arrow labeled 'a' to show acceleration. Place the equation F = m*a above the ball in bright blue text. Keep the ball photo visible.\"
}
";

pub const BIOLOGY_TEMPLATE: &str = "\
Given the following information:

Object: {object}
Image (optional): {image_url}

Return a JSON output with exactly four keys:
1. \"object\" - repeat the object's name.
2. \"equation\" - the most relevant quantitative biological relation for the object
   (surface-area-to-volume ratio, metabolic scaling, growth rate, diffusion).
3. \"explanation\" - a short explanation of the relation and how it applies to this object
   or the organism connected to it.
4. \"guide\" - a detailed instruction for overlaying biological AR annotations on the photo.

In \"guide\", include:
- Which anatomical or structural features to call out with leader lines and labels.
- The variables of the relation and where to pin each one on the object.
- Color and style per annotation (green labels for structures, white text for the relation).
- Where to place the main relation relative to the object.
- Emphasize: keep the real image visible - no redrawing, no object replacement.
";

pub const BIOLOGY_EXAMPLE: &str = "\
Example output:
{
  \"object\": \"leaf\",
  \"equation\": \"SA:V = 6/L\",
  \"explanation\": \"Surface-area-to-volume ratio for a thin structure - a flat leaf maximizes area for light capture per unit of tissue.\",
  \"guide\": \"Draw thin green leader lines to the blade, midrib, and veins with small labels. Pin 'SA' over the flat face and 'V' near the cross-section. Place SA:V = 6/L in white text above the leaf. Keep the leaf photo visible.\"
}
";

pub const ART_TEMPLATE: &str = "\
Given the following information:

Object: {object}
Image (optional): {image_url}

Return a JSON output with exactly four keys:
1. \"object\" - repeat the object's name.
2. \"equation\" - the most relevant compositional relation for the object
   (golden ratio phi = 1.618, rule of thirds, symmetry axis, proportion).
3. \"explanation\" - a short explanation of the relation and how the object's form or
   placement expresses it.
4. \"guide\" - a detailed instruction for overlaying artistic-analysis AR annotations
   on the photo.

In \"guide\", include:
- The construction lines to draw (thirds grid, golden spiral, symmetry axes) and where.
- The proportions or ratios to label directly on the object.
- Color and style per annotation (gold construction lines, white ratio labels).
- Where to place the main relation relative to the object.
- Emphasize: keep the real image visible - no redrawing, no object replacement.
";

pub const ART_EXAMPLE: &str = "\
Example output:
{
  \"object\": \"vase\",
  \"equation\": \"phi = a/b = 1.618\",
  \"explanation\": \"The golden ratio - the vase's neck-to-body height split approximates the classical proportion.\",
  \"guide\": \"Draw a thin gold horizontal line at the neck-body transition and label the two spans 'a' and 'b'. Overlay a faint golden spiral following the silhouette. Place phi = a/b = 1.618 in white text beside the vase. Keep the vase photo visible.\"
}
";

pub const ECO_TEMPLATE: &str = "\
Given the following information:

Object: {object}
Image (optional): {image_url}

Return a JSON output with exactly four keys:
1. \"object\" - repeat the object's name.
2. \"equation\" - the most relevant environmental relation for the object
   (embodied energy, carbon footprint per unit, recycling rate, decomposition time).
3. \"explanation\" - a short explanation of the relation and what it says about the
   object's environmental impact.
4. \"guide\" - a detailed instruction for overlaying eco AR annotations on the photo.

In \"guide\", include:
- Which material or component regions to highlight and what impact figure to pin on each.
- The variables of the relation and where each label sits.
- Color and style per annotation (green highlights for recyclable parts, amber for waste,
  white text for the relation).
- Where to place the main relation relative to the object.
- Emphasize: keep the real image visible - no redrawing, no object replacement.
";

pub const ECO_EXAMPLE: &str = "\
Example output:
{
  \"object\": \"plastic bottle\",
  \"equation\": \"E = 5.4 MJ per bottle\",
  \"explanation\": \"Approximate embodied energy of a single-use PET bottle, from raw material through manufacturing.\",
  \"guide\": \"Highlight the PET body in translucent green with the label 'recyclable'. Pin '~450 years' with an amber marker near the cap to note decomposition time. Place E = 5.4 MJ per bottle in white text above the bottle. Keep the bottle photo visible.\"
}
";

pub const CULTURE_TEMPLATE: &str = "\
Given the following information:

Object: {object}
Image (optional): {image_url}

Return a JSON output with exactly four keys:
1. \"object\" - repeat the object's name.
2. \"equation\" - one concrete dated fact or span for the object, written compactly
   (e.g. \"invented 1879\", \"in use since ~3000 BCE\").
3. \"explanation\" - a short explanation of the object's origin, spread, or cultural
   significance.
4. \"guide\" - a detailed instruction for overlaying cultural AR annotations on the photo.

In \"guide\", include:
- A short timeline ribbon or date badges to draw near the object and what each marks.
- Which features to connect to their historical origin with leader lines.
- Color and style per annotation (warm sepia badges, white text for the dated fact).
- Where to place the main dated fact relative to the object.
- Emphasize: keep the real image visible - no redrawing, no object replacement.
";

pub const CULTURE_EXAMPLE: &str = "\
Example output:
{
  \"object\": \"teapot\",
  \"equation\": \"in use since ~1500 CE\",
  \"explanation\": \"Purpose-built teapots spread from Yixing ware in Ming-dynasty China to Europe with the tea trade.\",
  \"guide\": \"Draw a short sepia timeline ribbon under the teapot with badges at 1500 and 1700. Connect the spout and handle to small origin notes with leader lines. Place 'in use since ~1500 CE' in white text above the teapot. Keep the teapot photo visible.\"
}
";

// -------------------- OVERLAY-PHASE INSTRUCTIONS --------------------

/// Math lens: the result is a schematic, not an edited photo.
pub const SCHEMATIC_OVERLAY_INSTRUCTION: &str = "\
You are an educational assistant specialized in mathematical visualization.

Rendering goal:
- Produce a glowing cyan skeleton diagram of the object described.
- Include labeled parameters (r, h, w, etc.) and the equation in neon-blue.
- Include the short explanation text in white, positioned near the equation.
- Keep the background transparent.
- The result must look like a holographic blueprint, NOT a photo overlay.

Do NOT:
- Include real photo texture, lighting, reflections, or colors.
- Overlay on a real image.
- Render realistic objects.

Your output should visualize only the geometric skeleton and annotations, \
like a digital AR teaching overlay with no real background.";

/// Every other lens keeps the photograph and annotates it.
pub const PHOTO_OVERLAY_INSTRUCTION: &str = "\
You are an educational AR assistant. Overlay helpful annotations while keeping \
the photo realistic. Do not redraw or replace the object; add clear labels, \
arrows, and text on top of the original photograph.";

/// Fallback rendering brief when the facts phase did not produce one.
pub const DEFAULT_GUIDE: &str = "Create a neon diagram of the object.";

/// Literal placeholder substituted when no image reference is available.
pub const IMAGE_URL_PLACEHOLDER: &str = "none";
