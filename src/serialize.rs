use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Structured payload serialization with a registry of custom encoders.
///
/// Most payloads are rendered by generic structural traversal through serde.
/// Value types that have no natural structural representation get an entry in
/// a process-wide registry mapping their `TypeId` to an encoding function;
/// the registry is consulted before generic traversal and overrides it for
/// that value only. The registry is built once, on first access, and never
/// mutated afterwards, so concurrent sessions can read it without
/// synchronization concerns.

/// An encoding function for one registered value type. The `&dyn Any`
/// argument is guaranteed to be of the type the function was registered for.
pub type EncodeFn = fn(&dyn Any) -> Value;

lazy_static! {
    /// Process-wide registry of custom structural encoders, keyed by the
    /// concrete type of the value being encoded. Immutable after
    /// initialization.
    static ref ENCODERS: HashMap<TypeId, EncodeFn> = {
        let mut encoders = HashMap::new();
        encoders.insert(TypeId::of::<Vector3i>(), encode_vector3i as EncodeFn);
        encoders
    };
}

fn encode_vector3i(value: &dyn Any) -> Value {
    // The registry key guarantees the downcast; a failure here is a defect
    // in the registry itself.
    let v = value
        .downcast_ref::<Vector3i>()
        .expect("encoder registered for Vector3i");
    json!({ "x": v.x, "y": v.y, "z": v.z })
}

/// Looks up a custom encoding for `value`, returning `None` when its type
/// has no registered encoder and generic traversal should apply.
pub fn encode_custom<T: Any>(value: &T) -> Option<Value> {
    ENCODERS
        .get(&TypeId::of::<T>())
        .map(|encode| encode(value as &dyn Any))
}

/// Encodes a payload as pretty-printed structured text.
///
/// The custom-encoder registry is consulted first; on a miss the payload is
/// traversed generically through its `Serialize` implementation. Encoding
/// failure is a defect in the payload type or the registry, not a runtime
/// condition — callers propagate it as an unrecoverable error rather than
/// silently truncating the trace.
pub fn to_pretty<T: Serialize + Any>(value: &T) -> Result<String, serde_json::Error> {
    if let Some(encoded) = encode_custom(value) {
        return serde_json::to_string_pretty(&encoded);
    }
    serde_json::to_string_pretty(value)
}

/// A 3-component integer vector, the canonical compound value type with no
/// natural structural representation.
///
/// Its `Serialize` implementation delegates to the registry so the
/// registered `{x, y, z}` object encoding applies wherever the vector
/// appears inside a larger payload, not only at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3i {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vector3i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Serialize for Vector3i {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match encode_custom(self) {
            Some(value) => value.serialize(serializer),
            None => {
                let mut state = serializer.serialize_struct("Vector3i", 3)?;
                state.serialize_field("x", &self.x)?;
                state.serialize_field("y", &self.y)?;
                state.serialize_field("z", &self.z)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector3i_encodes_as_named_fields() {
        let encoded = encode_custom(&Vector3i::new(1, 2, 3)).expect("registered encoder");
        assert_eq!(encoded, json!({ "x": 1, "y": 2, "z": 3 }));
    }

    #[test]
    fn unregistered_types_fall_back_to_generic_traversal() {
        assert!(encode_custom(&42u32).is_none());

        #[derive(Serialize)]
        struct Plain {
            a: u8,
        }
        let text = to_pretty(&Plain { a: 7 }).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({ "a": 7 }));
    }

    #[test]
    fn nested_vector3i_uses_registered_encoding() {
        #[derive(Serialize)]
        struct MovePacket {
            entity_id: u64,
            position: Vector3i,
        }

        let text = to_pretty(&MovePacket {
            entity_id: 9,
            position: Vector3i::new(-4, 64, 12),
        })
        .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["position"], json!({ "x": -4, "y": 64, "z": 12 }));
    }

    #[test]
    fn top_level_vector3i_uses_registered_encoding() {
        let text = to_pretty(&Vector3i::new(1, 2, 3)).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({ "x": 1, "y": 2, "z": 3 }));
    }

    #[test]
    fn output_is_pretty_printed() {
        let text = to_pretty(&Vector3i::new(1, 2, 3)).unwrap();
        assert!(text.contains('\n'), "structured output should be indented");
    }
}
