//! CIE L*a*b* color space conversions (D65 illuminant)
//!
//! The pipeline does contrast work on the lightness channel only, so RGB
//! bitmaps are split into quantized L, a, b planes and merged back. The
//! conversions are exact inverses of each other up to 8-bit quantization:
//! an achromatic round trip reproduces samples within +/-1.

use crate::bitmap::Bitmap;
use crate::parallel::parallel_for_each_chunk_mut;

/// LAB color representation (CIE L*a*b*)
/// - L: 0.0-100.0 (lightness)
/// - a: approximately -128 to +128 (green-red axis)
/// - b: approximately -128 to +128 (blue-yellow axis)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

/// D65 standard illuminant reference white point
const D65_X: f32 = 0.95047;
const D65_Y: f32 = 1.00000;
const D65_Z: f32 = 1.08883;

/// sRGB to XYZ matrix (D65)
const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.119_192, 0.9503041],
];

/// XYZ to sRGB matrix (D65)
const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.969_266, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// LAB f(t) function
#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA; // ~0.008856

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// LAB f^-1(t) inverse function
#[inline]
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// Convert RGB to CIE LAB (D65 illuminant)
///
/// Input: RGB values in range 0.0-1.0
/// Output: LAB where L is 0-100, a and b are approximately -128 to +128
#[inline]
pub fn rgb_to_lab(r: f32, g: f32, b: f32) -> Lab {
    let r = r.max(0.0);
    let g = g.max(0.0);
    let b = b.max(0.0);

    let m = &SRGB_TO_XYZ;
    let x = m[0][0] * r + m[0][1] * g + m[0][2] * b;
    let y = m[1][0] * r + m[1][1] * g + m[1][2] * b;
    let z = m[2][0] * r + m[2][1] * g + m[2][2] * b;

    // Normalize by reference white
    let fx = lab_f(x / D65_X);
    let fy = lab_f(y / D65_Y);
    let fz = lab_f(z / D65_Z);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    Lab { l, a, b }
}

/// Convert CIE LAB to RGB (D65 illuminant)
///
/// Input: LAB where L is 0-100, a and b are approximately -128 to +128
/// Output: RGB values (may be outside 0.0-1.0 for out-of-gamut colors)
#[inline]
pub fn lab_to_rgb(lab: Lab) -> (f32, f32, f32) {
    let Lab { l, a, b } = lab;

    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;

    let x = D65_X * lab_f_inv(fx);
    let y = D65_Y * lab_f_inv(fy);
    let z = D65_Z * lab_f_inv(fz);

    let m = &XYZ_TO_SRGB;
    let r = m[0][0] * x + m[0][1] * y + m[0][2] * z;
    let g = m[1][0] * x + m[1][1] * y + m[1][2] * z;
    let b = m[2][0] * x + m[2][1] * y + m[2][2] * z;

    (r, g, b)
}

/// Quantized L, a, b planes of a bitmap
///
/// 8-bit storage convention: L in 0-100 is scaled by 255/100,
/// a and b are offset by +128.
#[derive(Debug, Clone)]
pub struct LabPlanes {
    pub l: Vec<u8>,
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

/// Split an RGB bitmap into quantized L, a, b planes
pub fn rgb_to_lab_planes(bitmap: &Bitmap) -> LabPlanes {
    let count = bitmap.pixel_count();
    let mut l_plane = vec![0u8; count];
    let mut a_plane = vec![0u8; count];
    let mut b_plane = vec![0u8; count];

    for (i, rgb) in bitmap.data.chunks_exact(3).enumerate() {
        let lab = rgb_to_lab(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        );
        l_plane[i] = quantize_l(lab.l);
        a_plane[i] = quantize_ab(lab.a);
        b_plane[i] = quantize_ab(lab.b);
    }

    LabPlanes {
        l: l_plane,
        a: a_plane,
        b: b_plane,
    }
}

/// Merge quantized L, a, b planes back into an RGB bitmap
pub fn lab_planes_to_rgb(planes: &LabPlanes, width: u32, height: u32) -> Bitmap {
    let count = width as usize * height as usize;
    let mut data = vec![0u8; count * 3];

    let l_plane = &planes.l;
    let a_plane = &planes.a;
    let b_plane = &planes.b;

    parallel_for_each_chunk_mut(&mut data, 3, |i, rgb| {
        let lab = Lab {
            l: dequantize_l(l_plane[i]),
            a: dequantize_ab(a_plane[i]),
            b: dequantize_ab(b_plane[i]),
        };
        let (r, g, b) = lab_to_rgb(lab);
        rgb[0] = to_u8(r);
        rgb[1] = to_u8(g);
        rgb[2] = to_u8(b);
    });

    Bitmap {
        width,
        height,
        channels: 3,
        data,
    }
}

#[inline]
fn quantize_l(l: f32) -> u8 {
    (l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn dequantize_l(l: u8) -> f32 {
    l as f32 * 100.0 / 255.0
}

#[inline]
fn quantize_ab(v: f32) -> u8 {
    (v.round() + 128.0).clamp(0.0, 255.0) as u8
}

#[inline]
fn dequantize_ab(v: u8) -> f32 {
    v as f32 - 128.0
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
