//! Fog Color Calculator
//!
//! Marks outside the current selection are not hidden; they are blended
//! toward a tone derived from the host background ("fogged"), which keeps
//! them visible while de-emphasizing them.
//!
//! The blend constants depend only on the background and are computed once:
//!
//! ```text
//! blend      = 0.275 if every background channel <= 75, else 0.185
//! fogged_bg  = floor((1 - blend) * min(channel, 245))      per channel
//! fog(color) = floor(fogged_bg + color * blend)            per channel
//! ```

use anyhow::Result;
use once_cell::sync::OnceCell;
use plotters::style::RGBColor;
use tracing::debug;

use crate::color::{parse_color, to_hex};
use crate::error::Error;
use crate::FogOptions;

/// Blend factor for dark backgrounds (f32 0.275 widened)
pub const DARK_BLEND_FACTOR: f64 = 0.2750000059604645;
/// Blend factor for every other background (f32 0.185 widened)
pub const DEFAULT_BLEND_FACTOR: f64 = 0.1850000023841858;
/// A background is dark when no channel exceeds this value.
pub const DARK_CHANNEL_THRESHOLD: u8 = 75;
/// Background channels are capped here before blending.
pub const MAX_BACKGROUND_CHANNEL: u8 = 245;

pub const WHITE: RGBColor = RGBColor(255, 255, 255);

static FOG: OnceCell<Fog> = OnceCell::new();

pub fn blend_factor_for(background: RGBColor) -> f64 {
    let RGBColor(r, g, b) = background;
    if [r, g, b].iter().all(|c| *c <= DARK_CHANNEL_THRESHOLD) {
        DARK_BLEND_FACTOR
    } else {
        DEFAULT_BLEND_FACTOR
    }
}

/// Clamp the background and scale it by `1 - blend_factor`
pub fn compute_fog_color(background: RGBColor, blend_factor: f64) -> RGBColor {
    let scale = |c: u8| truncate((1.0 - blend_factor) * c.min(MAX_BACKGROUND_CHANNEL) as f64);
    let RGBColor(r, g, b) = background;
    RGBColor(scale(r), scale(g), scale(b))
}

// Floors, then saturates at 0 and 255 (`as u8` on a float clamps rather than
// wrapping modulo 256). The blend keeps valid inputs inside 0..=255.
fn truncate(value: f64) -> u8 {
    value.floor() as u8
}

/// Precomputed fog constants for one background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    background: RGBColor,
    blend_factor: f64,
    fogged_background: RGBColor,
}

impl Fog {
    pub fn new(background: RGBColor) -> Self {
        let blend_factor = blend_factor_for(background);
        Self {
            background,
            blend_factor,
            fogged_background: compute_fog_color(background, blend_factor),
        }
    }

    pub fn background(&self) -> RGBColor {
        self.background
    }

    pub fn blend_factor(&self) -> f64 {
        self.blend_factor
    }

    pub fn fogged_background(&self) -> RGBColor {
        self.fogged_background
    }

    pub fn apply(&self, color: RGBColor) -> RGBColor {
        let blend = |bg: u8, c: u8| truncate(bg as f64 + c as f64 * self.blend_factor);
        let RGBColor(br, bg, bb) = self.fogged_background;
        let RGBColor(r, g, b) = color;
        RGBColor(blend(br, r), blend(bg, g), blend(bb, b))
    }

    /// Parse `color_str` and return its fogged color as `#rrggbb`
    pub fn fog(&self, color_str: &str) -> Result<String> {
        Ok(to_hex(self.apply(parse_color(color_str)?)))
    }
}

/// Install the process-wide fog constants.
///
/// Succeeds if nothing is installed yet or the installed background matches;
/// a different background is rejected with [`Error::FogAlreadyInitialised`].
pub fn init_fog(options: &FogOptions) -> Result<&'static Fog> {
    let background = parse_color(&options.background)?;
    let fog = FOG.get_or_init(|| {
        debug!(background = %to_hex(background), "initialising fog constants");
        Fog::new(background)
    });
    if fog.background != background {
        return Err(Error::FogAlreadyInitialised(to_hex(fog.background)).into());
    }
    Ok(fog)
}

/// Process-wide fog constants, defaulting to a white background.
pub fn global_fog() -> &'static Fog {
    FOG.get_or_init(|| Fog::new(WHITE))
}

/// Fogged hex color for `color_str` against the process-wide background
pub fn calculate_fog_color(color_str: &str) -> Result<String> {
    global_fog().fog(color_str)
}
