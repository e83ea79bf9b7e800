use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
}

impl BlendMode {
    pub const ALL: [BlendMode; 3] = [BlendMode::Normal, BlendMode::Multiply, BlendMode::Screen];

    fn mix(self, backdrop: f32, source: f32) -> f32 {
        match self {
            BlendMode::Normal => source,
            BlendMode::Multiply => backdrop * source,
            BlendMode::Screen => 1.0 - (1.0 - backdrop) * (1.0 - source),
        }
    }
}

/// Composites `top` over `base` with straight (non-premultiplied) alpha.
///
/// `opacity` scales the alpha of `top` only. The blended color is weighted by
/// the backdrop alpha, so every mode degrades to Normal over transparency.
pub fn blend_pixel(base: Rgba<u8>, top: Rgba<u8>, mode: BlendMode, opacity: f32) -> Rgba<u8> {
    let opacity = opacity.clamp(0.0, 1.0);
    if top[3] == 0 || opacity <= 0.0 {
        return base;
    }
    if mode == BlendMode::Normal && top[3] == 255 && opacity >= 1.0 {
        return top;
    }

    let src_a = top[3] as f32 / 255.0 * opacity;
    let dst_a = base[3] as f32 / 255.0;
    // Opaque backdrops stay exactly opaque.
    let out_a = if base[3] == 255 {
        1.0
    } else {
        src_a + dst_a * (1.0 - src_a)
    };
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let cs = top[c] as f32 / 255.0;
        let cb = base[c] as f32 / 255.0;
        let blended = (1.0 - dst_a) * cs + dst_a * mode.mix(cb, cs);
        let premul = src_a * blended + dst_a * cb * (1.0 - src_a);
        out[c] = to_channel(premul / out_a);
    }
    out[3] = to_channel(out_a);
    Rgba(out)
}

/// Removes `amount` (0..=1) of the base alpha. Fully cleared pixels read back as
/// transparent black.
pub fn erase_pixel(base: Rgba<u8>, amount: f32) -> Rgba<u8> {
    let remaining = base[3] as f32 * (1.0 - amount.clamp(0.0, 1.0));
    let alpha = remaining.round() as u8;
    if alpha == 0 {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([base[0], base[1], base[2], alpha])
    }
}

fn to_channel(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
