//! PLY format support

use crate::{IoError, PointCloudReader, PointCloudWriter};
use depthcloud_core::{Point3f, PointSet, Result, Rgb};
use ply_rs::{
    parser::Parser,
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

/// Payload encoding of a written PLY file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlyFormat {
    #[default]
    Ascii,
    BinaryLittleEndian,
}

/// Options for writing PLY files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyWriteOptions {
    pub format: PlyFormat,
    /// Header comments, one per line
    pub comments: Vec<String>,
}

impl Default for PlyWriteOptions {
    fn default() -> Self {
        Self {
            format: PlyFormat::Ascii,
            comments: vec!["Created by depthcloud".to_string()],
        }
    }
}

impl PlyWriteOptions {
    pub fn ascii() -> Self {
        Self::default()
    }

    pub fn binary() -> Self {
        Self {
            format: PlyFormat::BinaryLittleEndian,
            ..Self::default()
        }
    }
}

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointSet> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let Some(vertex_element) = ply.payload.get("vertex") else {
            return Ok(PointSet::new());
        };

        let mut positions = Vec::with_capacity(vertex_element.len());
        let mut colors = Vec::with_capacity(vertex_element.len());
        let mut has_colors = true;

        for vertex in vertex_element {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            positions.push(Point3f::new(x, y, z));

            if has_colors {
                match extract_color(vertex) {
                    Some(color) => colors.push(color),
                    None => has_colors = false,
                }
            }
        }

        if has_colors && !positions.is_empty() {
            PointSet::from_parts(positions, colors)
        } else {
            Ok(PointSet::from_positions(positions))
        }
    }
}

impl PointCloudWriter for PlyWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointSet, path: P) -> Result<()> {
        Self::write_point_cloud_with_options(cloud, path, &PlyWriteOptions::default())
    }
}

impl PlyWriter {
    /// Write `cloud` with an explicit encoding. Colors, when present, are
    /// stored as `uchar` red/green/blue vertex properties.
    pub fn write_point_cloud_with_options<P: AsRef<Path>>(
        cloud: &PointSet,
        path: P,
        options: &PlyWriteOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = match options.format {
            PlyFormat::Ascii => Encoding::Ascii,
            PlyFormat::BinaryLittleEndian => Encoding::BinaryLittleEndian,
        };
        ply.header.comments.extend(options.comments.iter().cloned());

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = cloud.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        if cloud.has_colors() {
            for name in ["red", "green", "blue"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            }
        }
        ply.header.elements.add(vertex_element);

        let mut vertices = Vec::with_capacity(cloud.len());
        for (point, color) in cloud.iter() {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(point.x));
            vertex.insert("y".to_string(), Property::Float(point.y));
            vertex.insert("z".to_string(), Property::Float(point.z));
            if let Some(color) = color {
                let [r, g, b] = color_to_bytes(color);
                vertex.insert("red".to_string(), Property::UChar(r));
                vertex.insert("green".to_string(), Property::UChar(g));
                vertex.insert("blue".to_string(), Property::UChar(b));
            }
            vertices.push(vertex);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let writer_instance = Writer::new();
        writer_instance
            .write_ply(&mut writer, &mut ply)
            .map_err(|e| IoError::WriteError { message: e.to_string() })?;
        writer.flush()?;

        Ok(())
    }
}

fn color_to_bytes(color: &Rgb) -> [u8; 3] {
    color.map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        _ => Err(IoError::ParseError {
            message: format!("Property '{}' not found or invalid type", name),
        }
        .into()),
    }
}

/// Extract a normalized color from `red`/`green`/`blue` properties
fn extract_color(element: &DefaultElement) -> Option<Rgb> {
    let channel = |name: &str| match element.get(name) {
        Some(Property::UChar(val)) => Some(f64::from(*val) / 255.0),
        Some(Property::Float(val)) => Some(f64::from(*val)),
        Some(Property::Double(val)) => Some(*val),
        _ => None,
    };
    Some([channel("red")?, channel("green")?, channel("blue")?])
}
