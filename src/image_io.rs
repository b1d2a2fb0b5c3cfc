//! TGA image I/O for density maps
//!
//! Only uncompressed 8-bit grayscale and 24-bit color images are supported.
//! Color pixels are reduced to the mean of their channels on load.

use crate::{Error, Image, ImageGrayScale, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub struct TgaIo;

impl TgaIo {
    pub fn save_tga<P: AsRef<Path>>(path: P, img: &dyn Image) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::save_tga_writer(&mut writer, img)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes `img` as an 8-bit grayscale TGA with a top-left origin.
    pub fn save_tga_writer<W: Write>(mut writer: W, img: &dyn Image) -> Result<()> {
        if img.width() > u16::MAX as usize || img.height() > u16::MAX as usize {
            return Err(Error::InvalidParameter(
                "Image too large for TGA".to_string(),
            ));
        }

        let header = TgaHeader::new(img.width() as u16, img.height() as u16);
        writer.write_all(&header.to_bytes())?;

        for y in 0..img.height() {
            for x in 0..img.width() {
                writer.write_all(&[img.byte_value(x, y)])?;
            }
        }

        Ok(())
    }

    pub fn load_tga<P: AsRef<Path>>(path: P) -> Result<ImageGrayScale> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::FileLoad(format!("Unable to open {}: {}", path.display(), e))
        })?;
        Self::load_tga_reader(BufReader::new(file))
            .map_err(|e| Error::FileLoad(format!("{}: {}", path.display(), e)))
    }

    pub fn load_tga_reader<R: Read>(mut reader: R) -> Result<ImageGrayScale> {
        let header = TgaHeader::read(&mut reader)?;

        let channels = match (header.image_type, header.pixel_depth) {
            (2, 24) => 3,
            (3, 8) => 1,
            (2, _) => {
                return Err(Error::InvalidParameter(
                    "TGA has unsupported bit depth (expecting 24) for color TGAs".to_string(),
                ))
            }
            (3, _) => {
                return Err(Error::InvalidParameter(
                    "TGA has unsupported bit depth (expecting 8) for grayscale TGAs".to_string(),
                ))
            }
            _ => {
                return Err(Error::InvalidParameter(
                    "TGA has unsupported format (expecting grayscale or color)".to_string(),
                ))
            }
        };

        let width = header.width as usize;
        let height = header.height as usize;
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter("TGA has no pixels".to_string()));
        }

        // skip the optional image id field
        let mut id = vec![0u8; header.id_length as usize];
        reader.read_exact(&mut id)?;

        // read the pixels before allocating anything sized by the header
        let expected = width * height * channels;
        let mut data = Vec::new();
        reader.by_ref().take(expected as u64).read_to_end(&mut data)?;
        if data.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "TGA pixel data truncated: expected {} bytes, found {}",
                expected,
                data.len()
            )));
        }

        let flipped = header.y_axis_flipped();
        let mut img = ImageGrayScale::new(width, height);
        for (index, pixel) in data.chunks_exact(channels).enumerate() {
            let (x, y) = (index % width, index / width);
            let iy = if flipped { height - y - 1 } else { y };
            let sum: u32 = pixel.iter().map(|&b| b as u32).sum();
            img.set_value(x, iy, sum as f32 / (channels as f32 * 255.0));
        }
        Ok(img)
    }
}

struct TgaHeader {
    id_length: u8,
    image_type: u8,
    width: u16,
    height: u16,
    pixel_depth: u8,
    image_desc: u8,
}

impl TgaHeader {
    fn new(width: u16, height: u16) -> Self {
        Self {
            id_length: 0,
            image_type: 3,
            width,
            height,
            pixel_depth: 8,
            image_desc: 32,
        }
    }

    fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; 18];
        reader.read_exact(&mut bytes)?;
        Ok(Self::from_bytes(bytes))
    }

    /// Bottom-left origin unless descriptor bit 5 is set.
    fn y_axis_flipped(&self) -> bool {
        (self.image_desc & 0x20) == 0
    }

    fn from_bytes(bytes: [u8; 18]) -> Self {
        Self {
            id_length: bytes[0],
            image_type: bytes[2],
            width: u16::from_le_bytes([bytes[12], bytes[13]]),
            height: u16::from_le_bytes([bytes[14], bytes[15]]),
            pixel_depth: bytes[16],
            image_desc: bytes[17],
        }
    }

    fn to_bytes(&self) -> [u8; 18] {
        let mut bytes = [0u8; 18];
        bytes[0] = self.id_length;
        bytes[2] = self.image_type;
        bytes[12..14].copy_from_slice(&self.width.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.height.to_le_bytes());
        bytes[16] = self.pixel_depth;
        bytes[17] = self.image_desc;
        bytes
    }
}
