//! Height-to-color texture synthesis and the tile material.

use std::path::Path;

use crate::heightfield::HeightGrid;
use crate::sampling::ColorGradient;

/// RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba(rgba: [f32; 4]) -> Self {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: channel(rgba[0]),
            g: channel(rgba[1]),
            b: channel(rgba[2]),
            a: channel(rgba[3]),
        }
    }

    pub fn gray(value: f32) -> Self {
        Self::from_rgba([value, value, value, 1.0])
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Generated texture data
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

impl TextureData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::new(0, 0, 0, 255); (width * height) as usize],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = pixel;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Pixel {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            Pixel::new(0, 0, 0, 255)
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.to_bytes());
        }
        bytes
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(self.get_pixel(x, y).to_bytes()))
    }

    /// Write the texture as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)
    }
}

/// Texture sampling filter requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    /// Crisp texel edges; keeps color bands sharp on faceted tiles.
    #[default]
    Nearest,
    Linear,
}

/// Material descriptor for a tile: albedo texture plus its sampling filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub albedo: TextureData,
    pub filter: TextureFilter,
}

impl Material {
    pub fn new(albedo: TextureData) -> Self {
        Self {
            albedo,
            filter: TextureFilter::Nearest,
        }
    }
}

/// One pixel per grid cell, colored by sampling `gradient` at the cell's height.
pub fn colorize(grid: &HeightGrid, gradient: &dyn ColorGradient) -> TextureData {
    paint(grid, |h| Pixel::from_rgba(gradient.color_at(h)))
}

/// One pixel per grid cell, height as a gray level.
pub fn grayscale(grid: &HeightGrid) -> TextureData {
    paint(grid, Pixel::gray)
}

fn paint(grid: &HeightGrid, color: impl Fn(f32) -> Pixel) -> TextureData {
    let size = grid.size() as u32;
    let mut texture = TextureData::new(size, size);
    for y in 0..size {
        for x in 0..size {
            texture.set_pixel(x, y, color(grid.get(x as usize, y as usize)));
        }
    }
    texture
}
