// Lens modes: the fixed set of perspectives a request can be viewed through,
// each with its own system prompt, template, and overlay style.

pub mod prompts;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::core::errors::PromptError;

/// How the overlay phase should treat the source photo for a lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
    /// Non-photographic glowing schematic on a transparent background.
    Schematic,
    /// Keep the photo realistic and draw annotations on top.
    PhotoOverlay,
}

/// Static configuration record for one lens.
#[derive(Debug, Clone, Copy)]
pub struct LensConfig {
    /// Canonical short name used in filenames and wire responses.
    pub slug: &'static str,
    /// System instruction for the facts phase.
    pub system_prompt: &'static str,
    /// Prompt template with `{object}` / `{image_url}` placeholders.
    pub template: &'static str,
    /// Few-shot example block appended to the template.
    pub example: &'static str,
    pub overlay_style: OverlayStyle,
}

/// The closed set of supported lenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LensMode {
    Mathematician,
    Physicist,
    Biologist,
    Artist,
    Eco,
    Cultural,
}

pub const DEFAULT_LENS: LensMode = LensMode::Mathematician;

const MATH_LENS: LensConfig = LensConfig {
    slug: "math",
    system_prompt: prompts::MATH_SYSTEM,
    template: prompts::MATH_TEMPLATE,
    example: prompts::MATH_EXAMPLE,
    overlay_style: OverlayStyle::Schematic,
};

const PHYSICS_LENS: LensConfig = LensConfig {
    slug: "physics",
    system_prompt: prompts::PHYSICS_SYSTEM,
    template: prompts::PHYSICS_TEMPLATE,
    example: prompts::PHYSICS_EXAMPLE,
    overlay_style: OverlayStyle::PhotoOverlay,
};

const BIOLOGY_LENS: LensConfig = LensConfig {
    slug: "biology",
    system_prompt: prompts::BIOLOGY_SYSTEM,
    template: prompts::BIOLOGY_TEMPLATE,
    example: prompts::BIOLOGY_EXAMPLE,
    overlay_style: OverlayStyle::PhotoOverlay,
};

const ART_LENS: LensConfig = LensConfig {
    slug: "art",
    system_prompt: prompts::ART_SYSTEM,
    template: prompts::ART_TEMPLATE,
    example: prompts::ART_EXAMPLE,
    overlay_style: OverlayStyle::PhotoOverlay,
};

const ECO_LENS: LensConfig = LensConfig {
    slug: "eco",
    system_prompt: prompts::ECO_SYSTEM,
    template: prompts::ECO_TEMPLATE,
    example: prompts::ECO_EXAMPLE,
    overlay_style: OverlayStyle::PhotoOverlay,
};

const CULTURE_LENS: LensConfig = LensConfig {
    slug: "culture",
    system_prompt: prompts::CULTURE_SYSTEM,
    template: prompts::CULTURE_TEMPLATE,
    example: prompts::CULTURE_EXAMPLE,
    overlay_style: OverlayStyle::PhotoOverlay,
};

/// Alias table: every accepted spelling maps to its canonical lens.
static LENS_ALIASES: Lazy<HashMap<&'static str, LensMode>> = Lazy::new(|| {
    use LensMode::*;
    HashMap::from([
        ("math", Mathematician),
        ("maths", Mathematician),
        ("mathematician", Mathematician),
        ("mathematics", Mathematician),
        ("geometry", Mathematician),
        ("physics", Physicist),
        ("physicist", Physicist),
        ("phys", Physicist),
        ("bio", Biologist),
        ("biology", Biologist),
        ("biologist", Biologist),
        ("art", Artist),
        ("artist", Artist),
        ("artistic", Artist),
        ("eco", Eco),
        ("ecology", Eco),
        ("environment", Eco),
        ("environmental", Eco),
        ("culture", Cultural),
        ("cultural", Cultural),
        ("history", Cultural),
        ("heritage", Cultural),
    ])
});

impl LensMode {
    /// Resolve a free-text lens identifier. Total: any unrecognized or absent
    /// input falls back to the default lens.
    pub fn resolve(input: Option<&str>) -> LensMode {
        match input {
            Some(raw) => {
                let normalized = raw.trim().to_lowercase();
                LENS_ALIASES
                    .get(normalized.as_str())
                    .copied()
                    .unwrap_or(DEFAULT_LENS)
            }
            None => DEFAULT_LENS,
        }
    }

    pub fn config(&self) -> &'static LensConfig {
        match self {
            LensMode::Mathematician => &MATH_LENS,
            LensMode::Physicist => &PHYSICS_LENS,
            LensMode::Biologist => &BIOLOGY_LENS,
            LensMode::Artist => &ART_LENS,
            LensMode::Eco => &ECO_LENS,
            LensMode::Cultural => &CULTURE_LENS,
        }
    }

    pub fn slug(&self) -> &'static str {
        self.config().slug
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        self.config().overlay_style
    }

    /// Overlay-phase instruction for this lens.
    pub fn overlay_instruction(&self) -> &'static str {
        match self.overlay_style() {
            OverlayStyle::Schematic => prompts::SCHEMATIC_OVERLAY_INSTRUCTION,
            OverlayStyle::PhotoOverlay => prompts::PHOTO_OVERLAY_INSTRUCTION,
        }
    }
}

impl std::fmt::Display for LensMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// A fully substituted facts-phase prompt.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub system_instruction: &'static str,
    pub prompt: String,
}

/// Select the lens template and example block, substitute the object name and
/// image reference, and return the prompt plus the lens's system instruction.
/// Pure formatting; the only failure is an empty object name.
pub fn build_prompt(
    lens: LensMode,
    object_name: &str,
    image_url: Option<&str>,
) -> Result<BuiltPrompt, PromptError> {
    let object_name = object_name.trim();
    if object_name.is_empty() {
        return Err(PromptError::EmptyObjectName);
    }

    let image_url = image_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(prompts::IMAGE_URL_PLACEHOLDER);

    let config = lens.config();
    let body = config
        .template
        .replace("{object}", object_name)
        .replace("{image_url}", image_url);

    Ok(BuiltPrompt {
        system_instruction: config.system_prompt,
        prompt: format!("{}\n{}", body, config.example),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_names() {
        assert_eq!(LensMode::resolve(Some("math")), LensMode::Mathematician);
        assert_eq!(LensMode::resolve(Some("physics")), LensMode::Physicist);
        assert_eq!(LensMode::resolve(Some("bio")), LensMode::Biologist);
        assert_eq!(LensMode::resolve(Some("art")), LensMode::Artist);
        assert_eq!(LensMode::resolve(Some("eco")), LensMode::Eco);
        assert_eq!(LensMode::resolve(Some("culture")), LensMode::Cultural);
    }

    #[test]
    fn test_resolve_is_case_and_whitespace_insensitive() {
        assert_eq!(LensMode::resolve(Some("Physics ")), LensMode::Physicist);
        assert_eq!(LensMode::resolve(Some("  MATHS")), LensMode::Mathematician);
        assert_eq!(LensMode::resolve(Some("BiOlOgIsT")), LensMode::Biologist);
    }

    #[test]
    fn test_resolve_defaults_for_unknown_or_absent() {
        assert_eq!(LensMode::resolve(None), DEFAULT_LENS);
        assert_eq!(LensMode::resolve(Some("")), DEFAULT_LENS);
        assert_eq!(LensMode::resolve(Some("astrology")), DEFAULT_LENS);
    }

    #[test]
    fn test_every_alias_resolves_regardless_of_casing() {
        for (alias, lens) in LENS_ALIASES.iter() {
            assert_eq!(LensMode::resolve(Some(alias)), *lens);
            assert_eq!(LensMode::resolve(Some(&alias.to_uppercase())), *lens);
            assert_eq!(LensMode::resolve(Some(&format!("  {}  ", alias))), *lens);
        }
    }

    #[test]
    fn test_build_prompt_substitutes_object_and_url() {
        let built = build_prompt(
            LensMode::Mathematician,
            "bottle",
            Some("http://localhost/uploads/bottle.png"),
        )
        .unwrap();
        assert!(built.prompt.contains("bottle"));
        assert!(built.prompt.contains("http://localhost/uploads/bottle.png"));
        assert!(!built.prompt.contains("{object}"));
        assert!(!built.prompt.contains("{image_url}"));
        assert_eq!(built.system_instruction, prompts::MATH_SYSTEM);
    }

    #[test]
    fn test_build_prompt_defaults_image_placeholder() {
        let built = build_prompt(LensMode::Physicist, "ball", None).unwrap();
        assert!(built.prompt.contains("Image (optional): none"));
    }

    #[test]
    fn test_build_prompt_rejects_empty_object() {
        assert!(matches!(
            build_prompt(LensMode::Mathematician, "   ", None),
            Err(PromptError::EmptyObjectName)
        ));
    }

    #[test]
    fn test_overlay_style_per_lens() {
        assert_eq!(
            LensMode::Mathematician.overlay_style(),
            OverlayStyle::Schematic
        );
        for lens in [
            LensMode::Physicist,
            LensMode::Biologist,
            LensMode::Artist,
            LensMode::Eco,
            LensMode::Cultural,
        ] {
            assert_eq!(lens.overlay_style(), OverlayStyle::PhotoOverlay);
        }
    }
}
