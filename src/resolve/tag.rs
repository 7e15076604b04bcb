//! Wire tag calculation
//!
//! A field's tag is its number shifted left three bits, or-ed with the
//! wire-type code of its declared kind. Packed repeated fields are written
//! as a single length-delimited blob, so packing overrides the element
//! wire-type.

use crate::graph::FieldKind;
use crate::GeneratorError;

/// Low-level wire encoding of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 8-byte fixed
    Fixed64 = 1,
    /// Length-delimited (strings, bytes, messages, packed repeats)
    LengthDelimited = 2,
    /// 4-byte fixed
    Fixed32 = 5,
}

/// Wire-type code for a declared field kind
pub fn wire_type(kind: FieldKind) -> WireType {
    match kind {
        FieldKind::Message | FieldKind::String | FieldKind::Bytes => WireType::LengthDelimited,
        FieldKind::Float | FieldKind::Fixed32 | FieldKind::Sfixed32 => WireType::Fixed32,
        FieldKind::Double | FieldKind::Fixed64 | FieldKind::Sfixed64 => WireType::Fixed64,
        FieldKind::Int32
        | FieldKind::Int64
        | FieldKind::Uint32
        | FieldKind::Uint64
        | FieldKind::Sint32
        | FieldKind::Sint64
        | FieldKind::Bool
        | FieldKind::Enum => WireType::Varint,
    }
}

/// Compute the wire tag for a field
///
/// `pack` only matters for repeated fields whose element wire-type is not
/// already length-delimited. Field numbers must be positive.
pub fn make_tag(
    number: i32,
    kind: FieldKind,
    repeated: bool,
    pack: bool,
) -> Result<u32, GeneratorError> {
    if number <= 0 {
        return Err(GeneratorError::InvalidFieldNumber(number));
    }
    let mut wire = wire_type(kind);
    if repeated && pack && wire != WireType::LengthDelimited {
        wire = WireType::LengthDelimited;
    }
    Ok(((number as u32) << 3) | wire as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_tags_ignore_packing() {
        let kinds = [
            FieldKind::Int32,
            FieldKind::Fixed32,
            FieldKind::Double,
            FieldKind::String,
            FieldKind::Message,
        ];
        for kind in kinds {
            for number in [1, 7, 536_870_911] {
                assert_eq!(
                    make_tag(number, kind, false, true).unwrap(),
                    make_tag(number, kind, false, false).unwrap(),
                );
            }
        }
    }

    #[test]
    fn test_wire_type_codes() {
        assert_eq!(make_tag(1, FieldKind::Int32, false, false).unwrap(), 8);
        assert_eq!(make_tag(1, FieldKind::String, false, false).unwrap(), 10);
        assert_eq!(make_tag(2, FieldKind::Double, false, false).unwrap(), 17);
        assert_eq!(make_tag(3, FieldKind::Fixed32, false, false).unwrap(), 29);
    }

    #[test]
    fn test_packed_repeated_scalar_is_length_delimited() {
        assert_eq!(make_tag(1, FieldKind::Int32, true, true).unwrap(), 10);
        assert_eq!(make_tag(1, FieldKind::Fixed64, true, true).unwrap(), 10);
        assert_eq!(make_tag(1, FieldKind::Int32, true, false).unwrap(), 8);
    }

    #[test]
    fn test_packing_is_noop_for_length_delimited_elements() {
        for kind in [FieldKind::String, FieldKind::Bytes, FieldKind::Message] {
            assert_eq!(
                make_tag(4, kind, true, true).unwrap(),
                make_tag(4, kind, true, false).unwrap(),
            );
        }
    }

    #[test]
    fn test_nonpositive_field_numbers_rejected() {
        assert!(matches!(
            make_tag(0, FieldKind::Int32, false, false),
            Err(GeneratorError::InvalidFieldNumber(0))
        ));
        assert!(matches!(
            make_tag(-3, FieldKind::String, false, false),
            Err(GeneratorError::InvalidFieldNumber(-3))
        ));
    }
}
