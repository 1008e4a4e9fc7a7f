//! Swizzle accessor generation.
//!
//! [`swizzles`] is a pure function from `(dimension, max_len)` to accessor
//! descriptors; formatting them is the struct emitter's job.

use crate::ir::TypeInfo;
use crate::types::primitive_size;

/// The fixed component alphabet.
pub const COMPONENTS: [char; 4] = ['X', 'Y', 'Z', 'W'];

/// One accessor: its name and the component indices it selects, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swizzle {
    pub name: String,
    pub components: Vec<usize>,
}

impl Swizzle {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Every ordered selection with repetition of `2..=max_len` components drawn
/// from the first `dimension` letters, shortest first, lexicographic within a
/// length. Empty unless `dimension` is in `2..=4`; `max_len` is capped at
/// `dimension`.
pub fn swizzles(dimension: usize, max_len: usize) -> Vec<Swizzle> {
    if !(2..=COMPONENTS.len()).contains(&dimension) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for len in 2..=max_len.min(dimension) {
        for index in 0..dimension.pow(len as u32) {
            let mut components = vec![0; len];
            let mut rest = index;
            for slot in components.iter_mut().rev() {
                *slot = rest % dimension;
                rest /= dimension;
            }
            let name = components.iter().map(|&c| COMPONENTS[c]).collect();
            out.push(Swizzle { name, components });
        }
    }
    out
}

/// Component layout of a named-component family type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFamily {
    pub dimension: usize,
    /// Shared scalar type of the components.
    pub scalar: String,
    /// Field name of each component, in alphabet order.
    pub fields: Vec<String>,
}

impl ComponentFamily {
    /// Recognise a family type: the first digit of its name is its dimension
    /// (2 to 4), and the first `dimension` axis letters are scalar fields of
    /// one primitive type.
    pub fn of(ty: &TypeInfo) -> Option<Self> {
        let digit = ty.name.chars().find(|c| c.is_ascii_digit())?;
        let dimension = digit.to_digit(10)? as usize;
        if !(2..=COMPONENTS.len()).contains(&dimension) {
            return None;
        }
        let mut scalar: Option<&str> = None;
        let mut fields = Vec::with_capacity(dimension);
        for letter in &COMPONENTS[..dimension] {
            let field = ty.fields.iter().find(|f| {
                f.array_len.is_none()
                    && !f.placeholder
                    && f.name.len() == 1
                    && f.name.starts_with(|c: char| c.eq_ignore_ascii_case(letter))
            })?;
            primitive_size(&field.target_type)?;
            match scalar {
                Some(existing) if existing != field.target_type => return None,
                _ => scalar = Some(field.target_type.as_str()),
            }
            fields.push(field.name.clone());
        }
        Some(Self {
            dimension,
            scalar: scalar?.to_string(),
            fields,
        })
    }
}

/// How many leading axis letters (`X`, `XY`, ...) `ty` has as one-letter
/// fields, whatever their types.
pub fn axis_field_count(ty: &TypeInfo) -> usize {
    COMPONENTS
        .iter()
        .take_while(|letter| {
            ty.fields
                .iter()
                .any(|f| f.name.len() == 1 && f.name.starts_with(|c: char| c.eq_ignore_ascii_case(letter)))
        })
        .count()
}

/// Name of the `len`-component member of the family `name` belongs to
/// (`Vector3` → `Vector2`, `Vector3D` → `Vector2D`).
pub fn family_member(name: &str, len: usize) -> Option<String> {
    let digit = name.find(|c: char| c.is_ascii_digit())?;
    Some(format!("{}{len}{}", &name[..digit], &name[digit + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FieldInfo;

    fn field(name: &str, ty: &str, offset: u64) -> FieldInfo {
        FieldInfo {
            name: name.into(),
            source_type: ty.into(),
            target_type: ty.into(),
            offset,
            array_len: None,
            placeholder: false,
        }
    }

    fn vector(name: &str, fields: Vec<FieldInfo>) -> TypeInfo {
        TypeInfo {
            name: name.into(),
            source_name: name.into(),
            size: 4 * fields.len() as u64,
            fields,
            methods: Vec::new(),
        }
    }

    #[test]
    fn test_counts_follow_dimension_powers() {
        assert_eq!(swizzles(2, 2).len(), 4);
        assert_eq!(swizzles(3, 3).len(), 9 + 27);
        assert_eq!(swizzles(4, 4).len(), 16 + 64 + 256);
        assert_eq!(swizzles(4, 2).len(), 16);
        assert_eq!(swizzles(3, 9).len(), 36);
        assert!(swizzles(1, 4).is_empty());
        assert!(swizzles(5, 5).is_empty());
    }

    #[test]
    fn test_order_is_shortest_then_lexicographic() {
        let all = swizzles(3, 3);
        let names: Vec<&str> = all.iter().take(4).map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["XX", "XY", "XZ", "YX"]);
        assert_eq!(all[1].components, vec![0, 1]);
        assert_eq!(all[9].name, "XXX");
        assert_eq!(all.last().map(|s| s.name.as_str()), Some("ZZZ"));
    }

    #[test]
    fn test_family_recognition() {
        let v3 = vector(
            "Vector3",
            vec![field("X", "float", 0), field("Y", "float", 4), field("Z", "float", 8)],
        );
        let family = ComponentFamily::of(&v3).unwrap();
        assert_eq!(family.dimension, 3);
        assert_eq!(family.scalar, "float");
        assert_eq!(family.fields, vec!["X", "Y", "Z"]);

        let mixed = vector("Vector2", vec![field("X", "float", 0), field("Y", "int", 4)]);
        assert!(ComponentFamily::of(&mixed).is_none());
        let missing = vector("Vector3", vec![field("X", "float", 0), field("Y", "float", 4)]);
        assert!(ComponentFamily::of(&missing).is_none());
        let colour = vector("Color", vec![field("R", "float", 0)]);
        assert!(ComponentFamily::of(&colour).is_none());
    }

    #[test]
    fn test_family_member_names() {
        assert_eq!(family_member("Vector3", 2).as_deref(), Some("Vector2"));
        assert_eq!(family_member("Vector2D", 2).as_deref(), Some("Vector2D"));
        assert_eq!(family_member("Quaternion", 2), None);
    }
}
