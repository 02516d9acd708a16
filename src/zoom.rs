// ---------------------------------------------------------------------------
// Zoom engine: turns (viewport, image size, zoom setting) into canvas geometry
// ---------------------------------------------------------------------------

/// Below this factor the manual steps become multiplicative.
const SHRINK: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    /// Explicit factor.
    Manual,
    Fit,
    Fill,
}

/// Which viewport/image ratio a fit or fill uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioBranch {
    Width,
    Height,
}

impl RatioBranch {
    pub fn opposite(self) -> Self {
        match self {
            RatioBranch::Width => RatioBranch::Height,
            RatioBranch::Height => RatioBranch::Width,
        }
    }

    fn ratio(self, viewport: Size, image: Size) -> f64 {
        match self {
            RatioBranch::Width => viewport.width as f64 / image.width.max(1) as f64,
            RatioBranch::Height => viewport.height as f64 / image.height.max(1) as f64,
        }
    }
}

/// The branch that constrains the tighter dimension: `Width` when
/// `vw * h < vh * w`, `Height` otherwise (ties included).
pub fn constraining_branch(viewport: Size, image: Size) -> RatioBranch {
    let vw_h = viewport.width as u64 * image.height as u64;
    let vh_w = viewport.height as u64 * image.width as u64;
    if vw_h < vh_w {
        RatioBranch::Width
    } else {
        RatioBranch::Height
    }
}

pub fn fit_scale(viewport: Size, image: Size) -> f64 {
    if image.width <= viewport.width && image.height <= viewport.height {
        return 1.0;
    }
    constraining_branch(viewport, image).ratio(viewport, image)
}

pub fn fill_scale(viewport: Size, image: Size) -> f64 {
    constraining_branch(viewport, image)
        .opposite()
        .ratio(viewport, image)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    pub mode: ZoomMode,
    /// Only meaningful for `ZoomMode::Manual`.
    pub factor: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::manual(1.0)
    }
}

impl Zoom {
    pub fn manual(factor: f64) -> Self {
        Self { mode: ZoomMode::Manual, factor }
    }

    pub fn fit() -> Self {
        Self { mode: ZoomMode::Fit, factor: 1.0 }
    }

    pub fn fill() -> Self {
        Self { mode: ZoomMode::Fill, factor: 1.0 }
    }

    /// `fit`, `fill` or a positive float; anything else is 1.0.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "fit" => Self::fit(),
            "fill" => Self::fill(),
            other => match other.parse::<f64>() {
                Ok(z) if z.is_finite() && z > 0.0 => Self::manual(z),
                _ => Self::default(),
            },
        }
    }

    pub fn to_param(&self) -> String {
        match self.mode {
            ZoomMode::Fit => "fit".to_string(),
            ZoomMode::Fill => "fill".to_string(),
            ZoomMode::Manual => format!("{}", self.factor),
        }
    }

    pub fn scale(&self, viewport: Size, image: Size) -> f64 {
        match self.mode {
            ZoomMode::Manual => self.factor,
            ZoomMode::Fit => fit_scale(viewport, image),
            ZoomMode::Fill => fill_scale(viewport, image),
        }
    }

    /// Step up from the currently rendered scale.
    pub fn zoom_in(&mut self, current: f64, step: f64) {
        let z = if current > step { current + step } else { current / SHRINK };
        *self = Self::manual(z);
    }

    /// Step down from the currently rendered scale. Never reaches zero.
    pub fn zoom_out(&mut self, current: f64, step: f64) {
        let z = if current > step { current - step } else { current * SHRINK };
        *self = Self::manual(z);
    }
}

/// Canvas geometry in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub scale: f64,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Layout {
    /// Size of the scrollable document containing the canvas.
    pub fn document(&self, viewport: Size) -> Size {
        Size::new(
            (self.left + self.width).max(viewport.width),
            (self.top + self.height).max(viewport.height),
        )
    }
}

pub fn layout(viewport: Size, image: Size, zoom: &Zoom) -> Layout {
    let scale = zoom.scale(viewport, image);
    let width = ((image.width as f64 * scale).round() as u32).max(1);
    let height = ((image.height as f64 * scale).round() as u32).max(1);
    Layout {
        scale,
        left: viewport.width.saturating_sub(width) / 2,
        top: viewport.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
