//! Vision sensor wrapper

use bytes::Bytes;
use contracts::{
    CaptureFormat, ColorMode, Handle, LinkResult, ObjectKind, OpMode, ResampleFilter, VisionFrame,
};
use image::DynamicImage;
use tracing::instrument;

use crate::codec::{self, ImageRequest};
use crate::error::{Result, SceneError};
use crate::link::{LinkOperation, RemoteLink};
use crate::object::{ObjectRef, ObjectState};
use crate::streaming::StreamedRead;
use crate::typed_view::ObjectType;

pub(crate) struct VisionRead;

impl StreamedRead for VisionRead {
    type Reading = VisionFrame;

    const KIND: ObjectKind = ObjectKind::VisionSensor;
    const OPERATION: LinkOperation = LinkOperation::ReadVisionImage;

    fn read(link: &dyn RemoteLink, handle: Handle, mode: OpMode) -> LinkResult<VisionFrame> {
        link.read_vision_image(handle, CaptureFormat::Rgb, mode)
    }
}

/// Row-major RGB pixels, shape `(height, width, 3)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Bytes,
}

impl PixelBuffer {
    pub const CHANNELS: usize = 3;

    /// Fails unless `data` holds exactly `width * height * 3` bytes
    pub fn new(width: usize, height: usize, data: Bytes) -> Result<Self> {
        let expected = width * height * Self::CHANNELS;
        if data.len() != expected {
            return Err(SceneError::image(format!(
                "expected {expected} bytes for {width}x{height} RGB, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_frame(frame: VisionFrame) -> Result<Self> {
        Self::new(frame.width() as usize, frame.height() as usize, frame.pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, Self::CHANNELS)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<[u8; 3]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let offset = (row * self.width + col) * Self::CHANNELS;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }
}

/// Vision sensor
#[derive(Debug, Clone)]
pub struct VisionSensor {
    object: ObjectRef,
}

impl ObjectType for VisionSensor {
    const LABEL: &'static str = "vision_sensor";

    fn accepts(kind: ObjectKind) -> bool {
        kind == ObjectKind::VisionSensor
    }

    fn from_object(object: ObjectRef) -> Self {
        Self { object }
    }

    fn object(&self) -> &ObjectRef {
        &self.object
    }
}

impl VisionSensor {
    /// Current frame as a pixel buffer
    #[instrument(name = "vision_get_value", skip(self), fields(handle = self.object.handle()))]
    pub fn get_value(&self) -> Result<PixelBuffer> {
        let frame = match &mut *self.object.state() {
            ObjectState::Vision(stream) => stream
                .next::<VisionRead>(self.object.session(), self.object.handle())?,
            _ => {
                return Err(SceneError::InvalidKind {
                    object: self.object.to_string(),
                    expected: Self::LABEL,
                    actual: self.object.kind(),
                })
            }
        };
        PixelBuffer::from_frame(frame)
    }

    /// Current frame as an image
    pub fn get_image(&self, request: &ImageRequest) -> Result<DynamicImage> {
        let pixels = self.get_value()?;
        codec::render(&pixels, request)
    }

    /// Shorthand for [`VisionSensor::get_image`]
    pub fn get_image_with(
        &self,
        mode: ColorMode,
        size: Option<(u32, u32)>,
        filter: ResampleFilter,
    ) -> Result<DynamicImage> {
        self.get_image(&ImageRequest {
            mode,
            size,
            filter,
            flip_vertical: false,
        })
    }
}
