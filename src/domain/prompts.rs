use rand::seq::IndexedRandom;

/// Fixed quality suffix appended to every prompt before dispatch.
pub const ENHANCEMENT_SUFFIX: &str = "high quality, detailed, beautiful, masterpiece, best quality";

/// Style variations offered by the remix feature.
pub const REMIX_VARIATIONS: &[&str] = &[
    "in the style of Van Gogh",
    "as a watercolor painting",
    "in cyberpunk style",
    "as a pencil sketch",
    "with dramatic lighting",
    "in anime style",
    "as a vintage photograph",
    "with neon colors",
    "in minimalist style",
    "with surreal elements",
];

/// Apply the deterministic quality enhancement used for every synthesis
/// request.
pub fn enhance(prompt: &str) -> String {
    format!("{prompt}, {ENHANCEMENT_SUFFIX}")
}

/// Append a randomly chosen style variation to the prompt. Returns the
/// remixed prompt together with the variation that was picked.
pub fn remix(prompt: &str) -> (String, &'static str) {
    #[allow(clippy::expect_used)] // REMIX_VARIATIONS is a non-empty constant
    let variation = REMIX_VARIATIONS
        .choose(&mut rand::rng())
        .copied()
        .expect("variations list is non-empty");
    (format!("{prompt}, {variation}"), variation)
}
