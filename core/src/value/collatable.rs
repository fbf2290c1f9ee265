use crate::collation::{tag, Collatable};
use crate::value::Value;

// Collation for Value (single value). Tuple framing (escaping/terminators) is handled by the key encoder.
impl Collatable for Value {
    fn type_tag(&self) -> u8 {
        match self {
            Value::Null => tag::NULL,
            Value::Bool(b) => b.type_tag(),
            Value::I64(i) => i.type_tag(),
            Value::F64(f) => f.type_tag(),
            Value::String(s) => s.as_str().type_tag(),
            Value::Binary(bytes) => bytes.as_slice().type_tag(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),
            Value::Bool(b) => b.to_bytes(),
            Value::I64(i) => i.to_bytes(),
            Value::F64(f) => f.to_bytes(),
            Value::String(s) => s.as_str().to_bytes(),
            Value::Binary(bytes) => bytes.as_slice().to_bytes(),
        }
    }
}
