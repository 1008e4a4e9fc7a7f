//! Record layout computation (x86-64 LP64 rules).
//!
//! tree-sitter only gives us syntax, so sizes, alignments and field offsets
//! are derived here: natural alignment, struct padding, overlapping union
//! members, bit-field storage units and single non-virtual inheritance.

use std::collections::HashMap;

/// Size and alignment of a complete type, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLayout {
    pub size: u64,
    pub align: u64,
}

impl TypeLayout {
    pub const fn new(size: u64, align: u64) -> Self {
        Self { size, align }
    }

    const POINTER: TypeLayout = TypeLayout::new(8, 8);
}

/// Computed layout of one record.
#[derive(Debug, Clone, Default)]
pub struct RecordLayout {
    /// `None` when any member's layout is unknown.
    pub size: Option<u64>,
    pub align: u64,
    /// Field offsets in declaration order, anonymous members flattened.
    pub fields: Vec<(String, Option<u64>)>,
}

impl RecordLayout {
    pub fn offset_of(&self, field: &str) -> Option<u64> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, offset)| *offset)
    }

    pub fn type_layout(&self) -> Option<TypeLayout> {
        self.size.map(|size| TypeLayout::new(size, self.align))
    }
}

fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align.max(1)) * align.max(1)
}

/// Layout of a builtin type spelling, whitespace-normalized.
pub fn primitive_layout(spelling: &str) -> Option<TypeLayout> {
    let layout = match spelling {
        "bool" | "char" | "signed char" | "unsigned char" | "int8_t" | "uint8_t" => (1, 1),
        "short" | "short int" | "signed short" | "unsigned short" | "unsigned short int"
        | "int16_t" | "uint16_t" | "char16_t" => (2, 2),
        "int" | "signed" | "signed int" | "unsigned" | "unsigned int" | "int32_t"
        | "uint32_t" | "float" | "wchar_t" | "char32_t" => (4, 4),
        "long" | "long int" | "signed long" | "unsigned long" | "unsigned long int"
        | "long long" | "long long int" | "unsigned long long" | "unsigned long long int"
        | "int64_t" | "uint64_t" | "double" | "size_t" | "ptrdiff_t" | "intptr_t"
        | "uintptr_t" => (8, 8),
        "long double" => (16, 16),
        _ => return None,
    };
    Some(TypeLayout::new(layout.0, layout.1))
}

/// Strip qualifiers and elaborated-type keywords, collapse whitespace.
pub fn normalize_spelling(spelling: &str) -> String {
    spelling
        .split_whitespace()
        .filter(|word| !matches!(*word, "const" | "volatile" | "struct" | "union" | "class" | "enum"))
        .map(|word| word.strip_prefix("std::").unwrap_or(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Layouts of the named types seen so far in one translation unit.
#[derive(Debug, Default)]
pub struct LayoutTable {
    named: HashMap<String, TypeLayout>,
}

impl LayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the layout of a record, enum or alias.
    pub fn register(&mut self, name: &str, layout: TypeLayout) {
        if !name.is_empty() {
            self.named.insert(name.to_string(), layout);
        }
    }

    /// Resolve a base type spelling (no declarator decorations).
    pub fn resolve(&self, spelling: &str) -> Option<TypeLayout> {
        let spelling = normalize_spelling(spelling);
        primitive_layout(&spelling).or_else(|| self.named.get(&spelling).copied())
    }
}

/// Layout of a member declared with `element` as its base type.
pub fn declared(
    element: Option<TypeLayout>,
    indirect: bool,
    dims: &[Option<u64>],
) -> Option<TypeLayout> {
    let element = if indirect {
        TypeLayout::POINTER
    } else {
        element?
    };
    let mut count = 1u64;
    for dim in dims {
        count = count.checked_mul((*dim)?)?;
    }
    Some(TypeLayout::new(element.size.checked_mul(count)?, element.align))
}

/// Incremental layout of one record body, fed members in declaration order.
///
/// Struct position is tracked in bits so that bit-fields pack the way the
/// Itanium C++ ABI packs them: a bit-field starts at the next free bit unless
/// it would straddle an alignment boundary of its declared type, and the next
/// ordinary member starts at the next free byte.
#[derive(Debug)]
pub struct LayoutBuilder {
    is_union: bool,
    cursor_bits: u64,
    union_size: u64,
    align: u64,
    complete: bool,
    fields: Vec<(String, Option<u64>)>,
}

impl LayoutBuilder {
    pub fn new(is_union: bool) -> Self {
        Self {
            is_union,
            cursor_bits: 0,
            union_size: 0,
            align: 1,
            complete: true,
            fields: Vec::new(),
        }
    }

    /// Mark the layout as unknown from here on.
    pub fn poison(&mut self) {
        self.complete = false;
    }

    /// Place a single base class at the start of the record.
    pub fn place_base(&mut self, base: Option<TypeLayout>, base_is_empty: bool) {
        match base {
            Some(layout) if base_is_empty => self.align = self.align.max(layout.align),
            Some(layout) => {
                self.place(layout);
            }
            None => self.poison(),
        }
    }

    /// Reserve storage for a member and return its offset.
    pub fn place(&mut self, layout: TypeLayout) -> Option<u64> {
        if !self.complete {
            return None;
        }
        self.align = self.align.max(layout.align);
        if self.is_union {
            self.union_size = self.union_size.max(layout.size);
            Some(0)
        } else {
            let offset = align_up(self.cursor_bits.div_ceil(8), layout.align);
            self.cursor_bits = (offset + layout.size) * 8;
            Some(offset)
        }
    }

    /// Reserve `width` bits for a bit-field declared with type `unit`.
    pub fn place_bitfield(&mut self, unit: Option<TypeLayout>, width: u64) {
        let Some(unit) = unit else {
            self.poison();
            return;
        };
        if !self.complete {
            return;
        }
        let boundary = unit.align.max(1) * 8;
        if width == 0 {
            // unnamed `: 0` closes the current unit without affecting alignment
            if !self.is_union {
                self.cursor_bits = align_up(self.cursor_bits, boundary);
            }
            return;
        }
        self.align = self.align.max(unit.align);
        if self.is_union {
            self.union_size = self.union_size.max(width.div_ceil(8));
            return;
        }
        let start = self.cursor_bits;
        let straddles = start / boundary != (start + width - 1) / boundary;
        let start = if straddles {
            align_up(start, boundary)
        } else {
            start
        };
        self.cursor_bits = start + width;
    }

    /// Record a named field at `offset`.
    pub fn record_field(&mut self, name: &str, offset: Option<u64>) {
        self.fields.push((name.to_string(), offset));
    }

    /// Place an anonymous nested record and flatten its members.
    pub fn place_anonymous(&mut self, nested: &RecordLayout) {
        let base = nested.type_layout().and_then(|layout| self.place(layout));
        if base.is_none() {
            self.poison();
        }
        for (name, offset) in &nested.fields {
            let absolute = base.zip(*offset).map(|(base, offset)| base + offset);
            self.fields.push((name.clone(), absolute));
        }
    }

    pub fn finish(self) -> RecordLayout {
        let raw = if self.is_union {
            self.union_size
        } else {
            self.cursor_bits.div_ceil(8)
        };
        let size = self
            .complete
            .then(|| align_up(raw, self.align).max(1));
        RecordLayout {
            size,
            align: self.align,
            fields: self.fields,
        }
    }
}
