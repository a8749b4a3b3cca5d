//
// icon.rs
// DicomDir-Tools-rs
//
// Icon image sequences for image records: external PGM icons, thumbnails from pixel data, default and blank fallbacks.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context};
use dicom::core::value::DataSetSequence;
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::{DefaultDicomObject, InMemDicomObject};
use dicom::pixeldata::PixelDecoder;
use dicom_pixeldata::ConvertOptions;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat};
use tracing::{debug, warn};

use crate::dicom_access::ElementAccess;
use crate::options::DirOptions;
use crate::tags;

/// Pixel scaling capability used for icons. Optional: without it only icons that
/// already have the requested size can be used.
pub trait ImageSupport: Send + Sync {
    /// Rescales an 8-bit grayscale bitmap.
    fn scale_bitmap(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    ) -> anyhow::Result<Vec<u8>>;

    /// Renders `frame` (zero based) of the object's pixel data as an 8-bit monochrome bitmap.
    fn scale_from_image(
        &self,
        object: &DefaultDicomObject,
        frame: u32,
        target_width: u32,
        target_height: u32,
    ) -> anyhow::Result<Vec<u8>>;
}

/// [`ImageSupport`] backed by dicom-pixeldata and the image crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomImageSupport;

impl ImageSupport for DicomImageSupport {
    fn scale_bitmap(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    ) -> anyhow::Result<Vec<u8>> {
        let source = GrayImage::from_raw(width, height, pixels.to_vec())
            .context("bitmap size does not match its dimensions")?;
        Ok(imageops::resize(&source, target_width, target_height, FilterType::Triangle).into_raw())
    }

    fn scale_from_image(
        &self,
        object: &DefaultDicomObject,
        frame: u32,
        target_width: u32,
        target_height: u32,
    ) -> anyhow::Result<Vec<u8>> {
        // Decoding handles compressed syntaxes when the codecs are linked in.
        let decoded = object
            .decode_pixel_data()
            .context("Failed to decode pixel data")?;
        ensure!(
            frame < decoded.number_of_frames(),
            "frame {} out of range ({} frame(s))",
            frame,
            decoded.number_of_frames()
        );
        let options = ConvertOptions::new().force_8bit();
        let rendered = decoded
            .to_dynamic_image_with_options(frame, &options)
            .context("Failed to render frame")?;
        let gray = rendered.to_luma8();
        Ok(imageops::resize(&gray, target_width, target_height, FilterType::Triangle).into_raw())
    }
}

/// Which stage of the fallback chain produced an icon.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IconSource {
    External,
    Image,
    Default,
    Blank,
}

pub struct IconGenerator {
    support: Option<Box<dyn ImageSupport>>,
    prefix: Option<String>,
    default_icon: Option<PathBuf>,
}

impl std::fmt::Debug for IconGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconGenerator")
            .field("image_support", &self.support.is_some())
            .field("prefix", &self.prefix)
            .field("default_icon", &self.default_icon)
            .finish()
    }
}

impl IconGenerator {
    pub fn new(support: Option<Box<dyn ImageSupport>>, options: &DirOptions) -> Self {
        IconGenerator {
            support,
            prefix: options.icon_prefix.clone(),
            default_icon: options.default_icon.clone(),
        }
    }

    /// Generator without any image support: only external icons of the exact size are usable.
    pub fn without_support(options: &DirOptions) -> Self {
        IconGenerator::new(None, options)
    }

    /// Square monochrome icon of `size` pixels. Always yields `size * size` bytes;
    /// the last stage is an all-black bitmap.
    pub fn icon_pixels(&self, object: &DefaultDicomObject, name: &str, size: u32) -> (Vec<u8>, IconSource) {
        if let Some(prefix) = &self.prefix {
            let path = PathBuf::from(format!("{prefix}{name}"));
            match self.from_pgm(&path, size) {
                Ok(pixels) => return (pixels, IconSource::External),
                Err(e) => warn!(file = name, "cannot use external icon {}: {e:#}", path.display()),
            }
        } else {
            match self.from_image(object, size) {
                Ok(pixels) => return (pixels, IconSource::Image),
                Err(e) => warn!(
                    file = name,
                    "cannot create monochrome icon from image file, using default: {e:#}"
                ),
            }
        }
        if let Some(default_icon) = &self.default_icon {
            match self.from_pgm(default_icon, size) {
                Ok(pixels) => return (pixels, IconSource::Default),
                Err(e) => warn!(file = name, "cannot use default icon {}: {e:#}", default_icon.display()),
            }
        }
        debug!(file = name, "using blank icon");
        (vec![0; (size * size) as usize], IconSource::Blank)
    }

    /// Item of IconImageSequence (0088,0200) with the image pixel module of an 8-bit icon.
    pub fn icon_item(&self, object: &DefaultDicomObject, name: &str, size: u32) -> (InMemDicomObject, IconSource) {
        let (pixels, source) = self.icon_pixels(object, name, size);
        (icon_item_from_pixels(pixels, size), source)
    }

    fn from_image(&self, object: &DefaultDicomObject, size: u32) -> anyhow::Result<Vec<u8>> {
        let Some(support) = &self.support else {
            bail!("no image support available");
        };
        let frame = representative_frame(object);
        support.scale_from_image(object, frame - 1, size, size)
    }

    fn from_pgm(&self, path: &Path, size: u32) -> anyhow::Result<Vec<u8>> {
        let bytes = std::fs::read(path).with_context(|| format!("cannot open file {}", path.display()))?;
        ensure!(bytes.starts_with(b"P5"), "wrong file format for external icon (pgm required)");
        let gray = image::load_from_memory_with_format(&bytes, ImageFormat::Pnm)
            .context("corrupt file format for external icon (not pgm binary)")?
            .to_luma8();
        let (width, height) = gray.dimensions();
        if width == size && height == size {
            return Ok(gray.into_raw());
        }
        let Some(support) = &self.support else {
            bail!("cannot scale external icon, no image support available");
        };
        support.scale_bitmap(gray.as_raw(), width, height, size, size)
    }
}

/// One based frame used for the thumbnail: RepresentativeFrameNumber when given
/// (clamped to the frame count), else one third into the sequence for more than three frames.
pub fn representative_frame(dataset: &InMemDicomObject) -> u32 {
    let count = dataset
        .element_int(tags::NUMBER_OF_FRAMES)
        .filter(|n| *n > 0)
        .unwrap_or(1);
    let frame = match dataset.element_int(tags::REPRESENTATIVE_FRAME_NUMBER) {
        Some(frame) if frame > 0 => frame.min(count),
        _ if count > 3 => count / 3,
        _ => 1,
    };
    u32::try_from(frame).unwrap_or(1)
}

pub fn icon_item_from_pixels(pixels: Vec<u8>, size: u32) -> InMemDicomObject {
    let dimension = u16::try_from(size).unwrap_or(u16::MAX);
    let mut item = InMemDicomObject::new_empty();
    item.put(DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)));
    item.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    item.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(dimension)));
    item.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(dimension)));
    item.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(8_u16)));
    item.put(DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(8_u16)));
    item.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(7_u16)));
    item.put(DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)));
    item.put(DataElement::new(tags::PIXEL_DATA, VR::OB, PrimitiveValue::from(pixels)));
    item
}

pub fn icon_sequence(item: InMemDicomObject) -> DataElement<InMemDicomObject> {
    DataElement::new(tags::ICON_IMAGE_SEQUENCE, VR::SQ, DataSetSequence::from(vec![item]))
}
