//! Image descriptors.
//!
//! A viewer needs the full-resolution size of the image, the tile size and
//! the tile file format. These usually come from a Deep Zoom (`.dzi`) XML
//! descriptor stored next to the tile folder:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
//!        TileSize="256"
//!        Overlap="0"
//!        Format="jpg">
//!   <Size Width="46920" Height="33600" />
//! </Image>
//! ```
//!
//! Tiles are assumed not to overlap. A descriptor declaring an overlap is
//! still accepted, with a warning, and the overlap is ignored.

use roxmltree::{Document, Node};
use serde::Serialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::pyramid::DEFAULT_TILE_SIZE;
use crate::tile::DEFAULT_TILE_FORMAT;

/// Size and tiling of a deep zoom image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    /// Full resolution width in pixels
    pub width: u32,

    /// Full resolution height in pixels
    pub height: u32,

    /// Tile edge length in pixels
    pub tile_size: u32,

    /// Tile file extension
    pub format: String,
}

impl ImageDescriptor {
    /// Descriptor with the default tile size (256) and format (`jpg`).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tile_size: DEFAULT_TILE_SIZE,
            format: DEFAULT_TILE_FORMAT.to_string(),
        }
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Parse a Deep Zoom XML descriptor.
    ///
    /// The root must be an `Image` element with a `Size` child carrying the
    /// required `Width` and `Height`. `TileSize` and `Format` on `Image` fall
    /// back to the defaults when absent. Elements and attributes are matched
    /// by local name, so namespace prefixes are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDescriptor`] if the XML is malformed, an
    /// element or required attribute is missing, or a number does not parse.
    pub fn from_dzi_xml(xml: &str) -> Result<Self, ConfigError> {
        let document = Document::parse(xml)
            .map_err(|e| ConfigError::InvalidDescriptor(format!("malformed XML: {e}")))?;

        let image = document.root_element();
        if image.tag_name().name() != "Image" {
            return Err(ConfigError::InvalidDescriptor(format!(
                "expected root element Image, found {}",
                image.tag_name().name()
            )));
        }

        let size = image
            .children()
            .find(|node| node.is_element() && node.tag_name().name() == "Size")
            .ok_or_else(|| ConfigError::InvalidDescriptor("missing Size element".to_string()))?;

        let width = required_number(size, "Width")?;
        let height = required_number(size, "Height")?;

        let tile_size = match attribute(image, "TileSize") {
            Some(value) => parse_number("TileSize", value)?,
            None => DEFAULT_TILE_SIZE,
        };
        let format = attribute(image, "Format")
            .unwrap_or(DEFAULT_TILE_FORMAT)
            .to_string();

        if let Some(overlap) = attribute(image, "Overlap") {
            if parse_number("Overlap", overlap)? != 0 {
                warn!(overlap, "Descriptor declares tile overlap, which is ignored");
            }
        }

        Ok(Self {
            width,
            height,
            tile_size,
            format,
        })
    }

    /// Render this descriptor as Deep Zoom XML.
    pub fn to_dzi_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
       TileSize="{}"
       Overlap="0"
       Format="{}">
  <Size Width="{}" Height="{}" />
</Image>"#,
            self.tile_size, self.format, self.width, self.height
        )
    }
}

/// Value of the attribute `name` on `node`, ignoring any namespace prefix.
fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == name)
        .map(|attr| attr.value())
}

fn parse_number(name: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidDescriptor(format!("attribute {name} is not a number: '{value}'"))
    })
}

fn required_number(node: Node<'_, '_>, name: &str) -> Result<u32, ConfigError> {
    let value = attribute(node, name)
        .ok_or_else(|| ConfigError::InvalidDescriptor(format!("missing attribute {name}")))?;
    parse_number(name, value)
}
