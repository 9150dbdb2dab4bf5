//! Values that cross the host boundary.
//!
//! Everything is passed by copy. Engine objects never cross as pointers:
//! they are referred to by a [`RawHandle`] into the boundary's registry.

use std::fmt;

use glam::Vec3;
use keystone_backend::PrimitiveType;
use keystone_core::{BoundingBox, Entity};
use serde::{Deserialize, Serialize};

/// Opaque reference to an object registered with a
/// [`Boundary`](super::Boundary). Hosts store and pass it back, nothing more.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawHandle(pub u64);

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.0)
    }
}

/// A single argument or return value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// `float3` value array: `[x, y, z]`.
    Float3([f32; 3]),
    /// `Box` value array: `[center, halfExtent]`.
    Box([[f32; 3]; 2]),
    Entity(Entity),
    Handle(RawHandle),
}

impl Value {
    /// Boundary type name, as used in argument errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Float3(_) => "float3",
            Value::Box(_) => "Box",
            Value::Entity(_) => "Entity",
            Value::Handle(_) => "handle",
        }
    }

    #[must_use]
    pub fn as_handle(&self) -> Option<RawHandle> {
        match self {
            Value::Handle(h) => Some(*h),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<Entity> {
        match self {
            Value::Entity(e) => Some(*e),
            _ => None,
        }
    }
}

/// Conversion from a boundary [`Value`].
pub trait FromValue: Sized {
    /// Expected boundary type, reported when conversion fails.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

/// Conversion into a boundary [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(*value)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value_int! {
    u8 => "int in 0..=255",
    u32 => "non-negative 32-bit int",
    usize => "non-negative int",
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for Vec3 {
    const EXPECTED: &'static str = "float3";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float3(v) => Some(Vec3::from_array(*v)),
            _ => None,
        }
    }
}

impl FromValue for BoundingBox {
    const EXPECTED: &'static str = "Box";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Box(b) => Some(BoundingBox::from_array(*b)),
            _ => None,
        }
    }
}

impl FromValue for Entity {
    const EXPECTED: &'static str = "Entity";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_entity()
    }
}

impl FromValue for RawHandle {
    const EXPECTED: &'static str = "handle";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_handle()
    }
}

/// Primitive types cross as their engine enum values.
impl FromValue for PrimitiveType {
    const EXPECTED: &'static str = "PrimitiveType (0, 1, 3, 4 or 5)";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(0) => Some(PrimitiveType::Points),
            Value::Int(1) => Some(PrimitiveType::Lines),
            Value::Int(3) => Some(PrimitiveType::LineStrip),
            Value::Int(4) => Some(PrimitiveType::Triangles),
            Value::Int(5) => Some(PrimitiveType::TriangleStrip),
            _ => None,
        }
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for Vec3 {
    fn into_value(self) -> Value {
        Value::Float3(self.to_array())
    }
}

impl IntoValue for BoundingBox {
    fn into_value(self) -> Value {
        Value::Box(self.to_array())
    }
}

impl IntoValue for Entity {
    fn into_value(self) -> Value {
        Value::Entity(self)
    }
}

impl IntoValue for RawHandle {
    fn into_value(self) -> Value {
        Value::Handle(self)
    }
}
