//! Color math used by theme derivation.

use opentui::Rgba;

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
#[must_use]
pub fn color_from_hex(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
    Some(Rgba::new(channel(0)?, channel(2)?, channel(4)?, alpha))
}

#[must_use]
pub fn color_with_alpha(color: Rgba, alpha: f32) -> Rgba {
    Rgba::new(color.r, color.g, color.b, alpha.clamp(0.0, 1.0))
}

#[must_use]
pub fn color_luminance(color: Rgba) -> f32 {
    color
        .r
        .mul_add(0.299, color.g.mul_add(0.587, color.b * 0.114))
}

#[must_use]
pub fn color_lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: f32, y: f32| (y - x).mul_add(t, x);
    Rgba::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
}

/// Composite `fg` over `bg` (source-over).
#[must_use]
pub fn color_blend_over(fg: Rgba, bg: Rgba) -> Rgba {
    let src_a = fg.a.clamp(0.0, 1.0);
    let dst_a = bg.a.clamp(0.0, 1.0);
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a <= 0.0 {
        return Rgba::new(0.0, 0.0, 0.0, 0.0);
    }

    let out_r = (fg.r * src_a + bg.r * dst_a * (1.0 - src_a)) / out_a;
    let out_g = (fg.g * src_a + bg.g * dst_a * (1.0 - src_a)) / out_a;
    let out_b = (fg.b * src_a + bg.b * dst_a * (1.0 - src_a)) / out_a;
    Rgba::new(out_r, out_g, out_b, out_a)
}
