use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-shape numeric summary of an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Descriptor {
    /// A single flat feature vector (patch, histogram, embedding)
    Flat(Vector),
    /// Named sub-descriptors produced by fusion extractors
    Composite(CompositeDescriptor),
}

impl Descriptor {
    pub fn shape(&self) -> Shape {
        match self {
            Descriptor::Flat(v) => Shape::Flat(v.dim()),
            Descriptor::Composite(c) => c.shape(),
        }
    }

    /// Get the flat vector, if this is a flat descriptor
    pub fn as_flat(&self) -> Option<&Vector> {
        match self {
            Descriptor::Flat(v) => Some(v),
            Descriptor::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeDescriptor> {
        match self {
            Descriptor::Flat(_) => None,
            Descriptor::Composite(c) => Some(c),
        }
    }
}

impl From<Vector> for Descriptor {
    fn from(v: Vector) -> Self {
        Descriptor::Flat(v)
    }
}

impl From<CompositeDescriptor> for Descriptor {
    fn from(c: CompositeDescriptor) -> Self {
        Descriptor::Composite(c)
    }
}

/// One named component of a [`CompositeDescriptor`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Field {
    Scalar(f32),
    Vector(Vector),
}

impl Field {
    pub fn shape(&self) -> FieldShape {
        match self {
            Field::Scalar(_) => FieldShape::Scalar,
            Field::Vector(v) => FieldShape::Vector(v.dim()),
        }
    }
}

/// Ordered tuple of named fields.
///
/// Field names and order are fixed per extractor; two composites are only
/// comparable when their [`Shape`]s are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompositeDescriptor {
    fields: Vec<(String, Field)>,
}

impl CompositeDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: f32) -> Self {
        self.fields.push((name.into(), Field::Scalar(value)));
        self
    }

    #[must_use]
    pub fn with_vector(mut self, name: impl Into<String>, value: Vector) -> Self {
        self.fields.push((name.into(), Field::Vector(value)));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[(String, Field)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(Field::Scalar(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<&Vector> {
        match self.get(name) {
            Some(Field::Vector(v)) => Some(v),
            _ => None,
        }
    }

    pub fn shape(&self) -> Shape {
        Shape::Composite(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.shape()))
                .collect(),
        )
    }
}

/// Shape of a descriptor, used for compatibility checks and error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Flat(usize),
    Composite(Vec<(String, FieldShape)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar,
    Vector(usize),
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldShape::Scalar => write!(f, "scalar"),
            FieldShape::Vector(dim) => write!(f, "vector[{}]", dim),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Flat(dim) => write!(f, "flat[{}]", dim),
            Shape::Composite(fields) => {
                write!(f, "{{")?;
                for (i, (name, shape)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, shape)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(embedding_dim: usize) -> CompositeDescriptor {
        CompositeDescriptor::new()
            .with_scalar("warm", 0.5)
            .with_vector("embedding", Vector::zeros(embedding_dim))
    }

    #[test]
    fn test_composite_accessors() {
        let c = scene(4);
        assert_eq!(c.len(), 2);
        assert_eq!(c.scalar("warm"), Some(0.5));
        assert_eq!(c.vector("embedding").map(Vector::dim), Some(4));
        assert!(c.scalar("embedding").is_none());
        assert!(c.get("missing").is_none());
    }

    #[test]
    fn test_shapes_compare_by_field_dims() {
        assert_eq!(scene(4).shape(), scene(4).shape());
        assert_ne!(scene(4).shape(), scene(8).shape());
        let flat: Descriptor = Vector::zeros(3).into();
        assert_eq!(flat.shape(), Shape::Flat(3));
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Shape::Flat(147).to_string(), "flat[147]");
        assert_eq!(
            scene(2).shape().to_string(),
            "{warm: scalar, embedding: vector[2]}"
        );
    }
}
