use crate::models::GenerationSettings;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI image generator. Create high-quality, detailed images based on the user's prompt. Focus on visual clarity, artistic composition, and accurate representation of the described elements.";

/// Merge the system prompt, style, quality and dimensions into the text sent to the model.
///
/// An empty system prompt is treated as absent.
pub fn compose_prompt(
    prompt: &str,
    settings: &GenerationSettings,
    system_prompt: Option<&str>,
) -> String {
    let preamble = match system_prompt {
        Some(system) if !system.is_empty() => format!("{}\n\n", system),
        _ => String::new(),
    };

    format!(
        "{}Create a {} style image with {} quality. {}. Image should be {}x{} pixels.",
        preamble, settings.style, settings.quality, prompt, settings.width, settings.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quality, Style, PRESET_DIMENSIONS, QUALITY_OPTIONS, STYLE_PRESETS};

    #[test]
    fn test_red_fox_example() {
        let settings = GenerationSettings::new().with_steps(None);
        assert_eq!(
            compose_prompt("a red fox", &settings, None),
            "Create a realistic style image with standard quality. a red fox. Image should be 1024x1024 pixels."
        );
    }

    #[test]
    fn test_system_prompt_preamble() {
        let settings = GenerationSettings::new()
            .with_style(Style::Anime)
            .with_quality(Quality::High);
        let composed = compose_prompt("a cat", &settings, Some("Be bold."));
        assert_eq!(
            composed,
            "Be bold.\n\nCreate a anime style image with high quality. a cat. Image should be 1024x1024 pixels."
        );
        assert_eq!(
            compose_prompt("a cat", &settings, Some("")),
            compose_prompt("a cat", &settings, None)
        );
    }

    #[test]
    fn test_all_settings_appear_in_prompt() {
        for preset in PRESET_DIMENSIONS.iter() {
            for quality in QUALITY_OPTIONS.iter() {
                for style in STYLE_PRESETS.iter() {
                    let settings = GenerationSettings::new()
                        .with_preset(preset)
                        .with_quality(quality.value)
                        .with_style(style.value);
                    let composed = compose_prompt("x", &settings, Some(DEFAULT_SYSTEM_PROMPT));
                    assert!(composed.starts_with(DEFAULT_SYSTEM_PROMPT));
                    assert!(composed.contains(style.value.as_str()));
                    assert!(composed.contains(quality.value.as_str()));
                    assert!(composed.contains(&format!("{}x{}", preset.width, preset.height)));
                }
            }
        }
    }
}
