//! Color schemes and multi-stop interpolation engine.

/// RGB color with channel values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    /// Black -> bright green, the classic coverage ramp
    #[default]
    Green,
    /// Black -> White
    Grayscale,
    /// Pale yellow -> orange -> deep red (attention maps)
    Heat,
}

impl ColorScheme {
    /// All available schemes, useful for CLI value enumeration.
    pub const ALL: &[ColorScheme] = &[Self::Green, Self::Grayscale, Self::Heat];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Grayscale => "Grayscale",
            Self::Heat => "Heat",
        }
    }
}

// ─── Color stop definitions ────────────────────────────────────────────

const GREEN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 0, 0, 0),
    ColorStop::new(1.0, 0, 255, 0),
];

const HEAT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 212),
    ColorStop::new(0.33, 254, 196, 79),
    ColorStop::new(0.66, 217, 95, 14),
    ColorStop::new(1.00, 153, 52, 4),
];

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Green => multi_stop(GREEN_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Heat => multi_stop(HEAT_STOPS, t),
    }
}

/// Build a 256-entry discrete ramp for 8-bit palette export.
///
/// Entry `i` is the scheme evaluated at `i / 255`, so a quantized
/// percentage field indexes straight into it.
pub fn discrete_ramp(scheme: ColorScheme) -> [Rgb; 256] {
    std::array::from_fn(|i| evaluate(scheme, i as f64 / 255.0))
}
