//! Ion 1.0 binary wire constants: type codes, descriptor overlays, the
//! Binary Version Marker, and system symbol IDs.

use crate::types::IonType;

/// Binary Version Marker that opens every binary Ion 1.0 stream. It may
/// repeat at the top level, which resets the local symbol table.
pub const ION_BVM: [u8; 4] = [0xe0, 0x01, 0x00, 0xea];

/// Type codes — the high nibble of a type descriptor byte.
pub struct TypeCode;

impl TypeCode {
    /// Null or nop padding.
    pub const NULL: u8 = 0;
    pub const BOOL: u8 = 1;
    /// Positive (or zero) integer.
    pub const UINT: u8 = 2;
    /// Negative integer. Zero magnitude is illegal.
    pub const NINT: u8 = 3;
    pub const FLOT: u8 = 4;
    pub const DECI: u8 = 5;
    pub const TIME: u8 = 6;
    pub const SYMB: u8 = 7;
    pub const STRI: u8 = 8;
    pub const CLOB: u8 = 9;
    pub const BLOB: u8 = 10;
    pub const LIST: u8 = 11;
    pub const SEXP: u8 = 12;
    pub const STRU: u8 = 13;
    /// Annotation wrapper.
    pub const ANNO: u8 = 14;
    /// Reserved; illegal in Ion 1.0.
    pub const RSVD: u8 = 15;
}

/// Type-descriptor overlays — the type code shifted into the high nibble,
/// ready to be OR-ed with a length nibble.
pub struct TypeOverlay;

impl TypeOverlay {
    pub const NULL: u8 = TypeCode::NULL << 4;
    pub const BOOL: u8 = TypeCode::BOOL << 4;
    pub const UINT: u8 = TypeCode::UINT << 4;
    pub const NINT: u8 = TypeCode::NINT << 4;
    pub const FLOT: u8 = TypeCode::FLOT << 4;
    pub const DECI: u8 = TypeCode::DECI << 4;
    pub const TIME: u8 = TypeCode::TIME << 4;
    pub const SYMB: u8 = TypeCode::SYMB << 4;
    pub const STRI: u8 = TypeCode::STRI << 4;
    pub const CLOB: u8 = TypeCode::CLOB << 4;
    pub const BLOB: u8 = TypeCode::BLOB << 4;
    pub const LIST: u8 = TypeCode::LIST << 4;
    pub const SEXP: u8 = TypeCode::SEXP << 4;
    pub const STRU: u8 = TypeCode::STRU << 4;
    pub const ANNO: u8 = TypeCode::ANNO << 4;
}

/// Length nibble meaning "length follows as a VarUInt".
pub const LENGTH_VARUINT: u8 = 14;

/// Length nibble meaning "typed null".
pub const LENGTH_NULL: u8 = 15;

/// The fixed Ion 1.0 system symbols. Index 0 is unused; SIDs 1..=9 map to
/// the remaining entries.
pub const SYSTEM_SYMBOLS: [&str; 10] = [
    "",
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

pub const SID_ION: u64 = 1;
pub const SID_ION_1_0: u64 = 2;
pub const SID_ION_SYMBOL_TABLE: u64 = 3;
pub const SID_NAME: u64 = 4;
pub const SID_VERSION: u64 = 5;
pub const SID_IMPORTS: u64 = 6;
pub const SID_SYMBOLS: u64 = 7;
pub const SID_MAX_ID: u64 = 8;
pub const SID_ION_SHARED_SYMBOL_TABLE: u64 = 9;

/// Maps a binary type code to the Ion type it carries, or `None` for the
/// codes that do not denote a value type by themselves.
pub fn type_for_code(code: u8) -> Option<IonType> {
    match code {
        TypeCode::NULL => Some(IonType::Null),
        TypeCode::BOOL => Some(IonType::Bool),
        TypeCode::UINT | TypeCode::NINT => Some(IonType::Int),
        TypeCode::FLOT => Some(IonType::Float),
        TypeCode::DECI => Some(IonType::Decimal),
        TypeCode::TIME => Some(IonType::Timestamp),
        TypeCode::SYMB => Some(IonType::Symbol),
        TypeCode::STRI => Some(IonType::String),
        TypeCode::CLOB => Some(IonType::Clob),
        TypeCode::BLOB => Some(IonType::Blob),
        TypeCode::LIST => Some(IonType::List),
        TypeCode::SEXP => Some(IonType::Sexp),
        TypeCode::STRU => Some(IonType::Struct),
        _ => None,
    }
}

/// Maps an Ion type to the overlay used when writing its typed null.
pub fn null_overlay_for(t: IonType) -> u8 {
    match t {
        IonType::Bool => TypeOverlay::BOOL,
        IonType::Int => TypeOverlay::UINT,
        IonType::Float => TypeOverlay::FLOT,
        IonType::Decimal => TypeOverlay::DECI,
        IonType::Timestamp => TypeOverlay::TIME,
        IonType::Symbol => TypeOverlay::SYMB,
        IonType::String => TypeOverlay::STRI,
        IonType::Clob => TypeOverlay::CLOB,
        IonType::Blob => TypeOverlay::BLOB,
        IonType::List => TypeOverlay::LIST,
        IonType::Sexp => TypeOverlay::SEXP,
        IonType::Struct => TypeOverlay::STRU,
        _ => TypeOverlay::NULL,
    }
}
