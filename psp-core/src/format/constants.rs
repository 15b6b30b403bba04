//! Format constants for PSP dumps

/// Size of the global header: f64 time, u32 body count, u32 component count
pub const GLOBAL_HEADER_SIZE: usize = 16;

/// Component magic with the float width in the low nibble
pub const COMPONENT_MAGIC: u32 = 0xADBF_ABC0;

/// Mask selecting the magic bits of a component's first word
pub const COMPONENT_MAGIC_MASK: u32 = 0xFFFF_FFF0;

/// Width of the optional per-record sequence index (i64)
pub const INDEX_WIDTH: usize = 8;

/// Width of one extra integer attribute (i32)
pub const INT_ATTR_WIDTH: usize = 4;

/// Number of floating core fields: mass, 3 position, 3 velocity, potential
pub const CORE_FLOAT_FIELDS: usize = 8;

/// Names of the floating core fields, in wire order
pub const CORE_FLOAT_NAMES: [&str; CORE_FLOAT_FIELDS] =
    ["m", "x", "y", "z", "vx", "vy", "vz", "potE"];

/// Name of the sequence index column
pub const INDEX_NAME: &str = "index";

/// Separator between the fields of a component info string
pub const INFO_SEPARATOR: char = ':';

/// Separator between parameter entries
pub const PARAM_SEPARATOR: char = ',';

/// Parameter controlling whether records carry a sequence index
pub const INDEXING_PARAM: &str = "indexing";

/// Upper bound on `nint + nfloat` for one component
pub const MAX_ATTRIBUTES: u32 = 4096;
