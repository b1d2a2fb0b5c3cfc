//! Grayscale images used as density maps

pub trait Image {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Lightness in `[0, 1]`; 0 is black.
    fn gray_value(&self, x: usize, y: usize) -> f32;

    fn byte_value(&self, x: usize, y: usize) -> u8 {
        (self.gray_value(x, y).clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Mean lightness over the half-open pixel rectangle `[x0, x1) x [y0, y1)`.
    ///
    /// Returns `None` when the rectangle contains no pixels.
    fn mean_gray(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Option<f32> {
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        let mut total = 0.0f64;
        for y in y0..y1 {
            for x in x0..x1 {
                total += self.gray_value(x, y) as f64;
            }
        }
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        Some((total / count) as f32)
    }
}

#[derive(Debug, Clone)]
pub struct ImageGrayScale {
    width: usize,
    height: usize,
    pub values: Vec<f32>,
}

impl ImageGrayScale {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn set_value(&mut self, x: usize, y: usize, value: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.values[y * self.width + x] = value;
    }

    pub fn value(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.values[y * self.width + x]
    }
}

impl Image for ImageGrayScale {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn gray_value(&self, x: usize, y: usize) -> f32 {
        self.value(x, y)
    }
}
