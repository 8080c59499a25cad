//! Core geometric and colour types shared by the pipeline and its operations.
//!
//! # Main Types
//!
//! - [`Vector3`] - double precision 3D vector used for positions and normals
//! - [`Uv`] / [`Vertex`] - the raw vertex record a [`VertexSource`](crate::pipeline::VertexSource) supplies
//! - [`Side`] - one of the six axis-aligned faces of a unit block
//! - [`LightCoord`] - interpolation weights for sampling a [`LightMatrix`]
//! - [`rgba`] - helpers for packed `0xRRGGBBAA` colours
//!
//! Colours are packed `u32` values in RGBA order. `0xFFFF_FFFF` (white) is
//! both the identity for [`rgba::multiply`] and the "unset" base colour.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A 3D vector with `f64` components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Length of the projection of `self` onto `axis`.
    #[inline]
    pub fn scalar_project(self, axis: Vector3) -> f64 {
        let len = axis.length();
        if len == 0.0 {
            0.0
        } else {
            self.dot(axis) / len
        }
    }

    /// Returns `true` if every component is within `epsilon` of `other`.
    pub fn approx_eq(self, other: Vector3, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// Texture coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl Uv {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// Raw vertex record: position plus base texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vector3,
    pub uv: Uv,
}

impl Vertex {
    pub const fn new(position: Vector3, uv: Uv) -> Self {
        Self { position, uv }
    }

    pub fn at(x: f64, y: f64, z: f64, u: f64, v: f64) -> Self {
        Self::new(Vector3::new(x, y, z), Uv::new(u, v))
    }
}

/// One of the six axis-aligned faces of a unit block.
///
/// Discriminants match the index order of [`Side::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    #[default]
    Down = 0,
    Up = 1,
    North = 2,
    South = 3,
    West = 4,
    East = 5,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Down,
        Side::Up,
        Side::North,
        Side::South,
        Side::West,
        Side::East,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Side for `index % 6`.
    #[inline]
    pub fn from_index(index: usize) -> Side {
        Side::ALL[index % 6]
    }

    /// Unit outward normal of this side.
    pub fn axis(self) -> Vector3 {
        match self {
            Side::Down => Vector3::new(0.0, -1.0, 0.0),
            Side::Up => Vector3::new(0.0, 1.0, 0.0),
            Side::North => Vector3::new(0.0, 0.0, -1.0),
            Side::South => Vector3::new(0.0, 0.0, 1.0),
            Side::West => Vector3::new(-1.0, 0.0, 0.0),
            Side::East => Vector3::new(1.0, 0.0, 0.0),
        }
    }

    /// Side whose axis is closest to `normal` (largest dot product).
    pub fn from_normal(normal: Vector3) -> Side {
        let mut best = Side::Down;
        let mut best_dot = f64::NEG_INFINITY;
        for side in Side::ALL {
            let d = normal.dot(side.axis());
            if d > best_dot {
                best_dot = d;
                best = side;
            }
        }
        best
    }
}

/// Packed RGBA colour helpers.
pub mod rgba {
    /// Opaque white, the multiplicative identity.
    pub const WHITE: u32 = 0xFFFF_FFFF;

    #[inline]
    pub fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
        (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
    }

    #[inline]
    pub fn unpack(colour: u32) -> [u8; 4] {
        colour.to_be_bytes()
    }

    /// Component-wise multiply of two packed colours, each channel scaled to `0..=255`.
    pub fn multiply(a: u32, b: u32) -> u32 {
        let a = unpack(a);
        let b = unpack(b);
        let mut out = [0u8; 4];
        for i in 0..4 {
            out[i] = ((a[i] as u32 * b[i] as u32 + 127) / 255) as u8;
        }
        u32::from_be_bytes(out)
    }

    /// Replace the alpha channel.
    #[inline]
    pub fn with_alpha(colour: u32, alpha: u8) -> u32 {
        (colour & 0xFFFF_FF00) | alpha as u32
    }
}

/// Bilinear interpolation weights over the four corners of a face.
///
/// `side` is in `0..12`: values below 6 mean the sample lies on the face
/// plane of that side (sampled from the neighbouring block), values `6..12`
/// mean it lies inside the block for side `side - 6`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LightCoord {
    pub side: u8,
    pub fa: f32,
    pub fb: f32,
    pub fc: f32,
    pub fd: f32,
}

impl LightCoord {
    /// Compute weights for `offset` (a position relative to the block origin) on `side`.
    pub fn compute(offset: Vector3, side: Side) -> LightCoord {
        let on_face = match side {
            Side::Down => offset.y <= 0.0,
            Side::Up => offset.y >= 1.0,
            Side::North => offset.z <= 0.0,
            Side::South => offset.z >= 1.0,
            Side::West => offset.x <= 0.0,
            Side::East => offset.x >= 1.0,
        };
        let lc_side = if on_face {
            side as u8
        } else {
            side as u8 + 6
        };

        let pair = (lc_side & 0xE) as usize;
        let v1 = Side::from_index(pair + 3).axis();
        let v2 = Side::from_index(pair + 5).axis();
        let d1 = offset.scalar_project(v1) as f32;
        let d2 = 1.0 - d1;
        let d3 = offset.scalar_project(v2) as f32;
        let d4 = 1.0 - d3;

        LightCoord {
            side: lc_side,
            fa: d2 * d4,
            fb: d2 * d3,
            fc: d1 * d4,
            fd: d1 * d3,
        }
    }

    /// The block face this coordinate belongs to.
    #[inline]
    pub fn face(&self) -> Side {
        Side::from_index(self.side as usize)
    }

    #[inline]
    pub fn weights(&self) -> [f32; 4] {
        [self.fa, self.fb, self.fc, self.fd]
    }
}

/// Corner brightness samples around a block, used to derive per-vertex lightmap values.
///
/// Brightness values are packed lightmap coordinates: `sky << 16 | block`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightMatrix {
    /// World position of the block the samples were taken around.
    pub origin: Vector3,
    /// Four corner samples for each [`Side`], in `LightCoord` weight order.
    pub corners: [[u32; 4]; 6],
}

impl LightMatrix {
    /// A matrix with the same brightness at every corner.
    pub fn uniform(origin: Vector3, brightness: u32) -> Self {
        Self {
            origin,
            corners: [[brightness; 4]; 6],
        }
    }

    /// Interpolate the packed brightness for `lc`.
    pub fn brightness(&self, lc: &LightCoord) -> u32 {
        let corners = &self.corners[lc.face().index()];
        let weights = lc.weights();
        let mut block = 0.0f32;
        let mut sky = 0.0f32;
        for (corner, weight) in corners.iter().zip(weights) {
            block += (corner & 0xFFFF) as f32 * weight;
            sky += (corner >> 16) as f32 * weight;
        }
        (sky.round().max(0.0) as u32) << 16 | (block.round().max(0.0) as u32 & 0xFFFF)
    }
}

impl Default for LightMatrix {
    fn default() -> Self {
        Self::uniform(Vector3::ZERO, 0x00F0_00F0)
    }
}
