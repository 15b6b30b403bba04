//! Global and component header definitions
//!
//! ## Global header (16 bytes)
//! ```text
//! [0x00] time             (f64 LE)
//! [0x08] total bodies     (u32 LE)
//! [0x0C] component count  (u32 LE)
//! ```
//!
//! ## Component header
//! ```text
//! [opt]  magic     0xADBFABC0 | float width   (u32 LE)
//! [opt]  rsize     float width, 4 or 8        (u32 LE)
//!        nbodies                              (i32 LE)
//!        nint      extra int attributes       (i32 LE)
//!        nfloat    extra float attributes     (i32 LE)
//!        ninfochar info block length          (u32 LE)
//!        info      "name : id : cparam : fparam" (ninfochar bytes)
//! ```
//!
//! The two leading words are absent in legacy dumps, which are always
//! double precision.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::constants::*;
use super::layout::RecordLayout;
use crate::validation::parsing::{decode_parameters, encode_parameters, Parameters};
use crate::{ByteCursor, PspError, Result, ScalarKind};

/// Global dump header
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalHeader {
    /// Simulation time of the dump
    pub time: f64,
    /// Total number of bodies across all components
    pub total_bodies: u32,
    /// Number of components that follow
    pub component_count: u32,
}

impl GlobalHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = GLOBAL_HEADER_SIZE;

    /// Decode the header at the cursor
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let time = cursor.read_f64()?;
        let total_bodies = cursor.read_u32()?;
        let component_count = cursor.read_u32()?;
        Ok(Self {
            time,
            total_bodies,
            component_count,
        })
    }

    /// Convert to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.time.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.total_bodies.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.component_count.to_le_bytes());
        bytes
    }
}

/// Width of a component's floating point fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    /// Get the size in bytes of one floating field
    pub const fn size_bytes(&self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }

    pub const fn kind(&self) -> ScalarKind {
        match self {
            Precision::Single => ScalarKind::F32,
            Precision::Double => ScalarKind::F64,
        }
    }

    /// Precision for a float width taken from a component magic
    pub const fn from_width(width: u32) -> Option<Self> {
        match width {
            4 => Some(Precision::Single),
            8 => Some(Precision::Double),
            _ => None,
        }
    }

    /// Magic word announcing this precision
    pub const fn magic(&self) -> u32 {
        COMPONENT_MAGIC | self.size_bytes() as u32
    }
}

/// Decoded text block of a component header
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentInfo {
    /// Component name, unique within a dump
    pub name: String,
    /// Force / model identifier
    pub id: String,
    /// Component parameters
    pub parameters: Parameters,
    /// Force parameters
    pub force_parameters: Parameters,
}

impl ComponentInfo {
    /// Parse an info block
    ///
    /// Blocks spanning several lines, or starting with `---` or `{`, are
    /// YAML mappings with `name`, `id`, `parameters` and `force` keys.
    /// Anything else is the single-line `name : id : cparam : fparam` form.
    /// On failure the reason is returned.
    pub fn parse(text: &str) -> core::result::Result<Self, &'static str> {
        if is_yaml(text) {
            #[cfg(feature = "yaml")]
            return super::yaml::parse_info(text);
            #[cfg(not(feature = "yaml"))]
            return Err("YAML info block needs the yaml feature");
        }
        Self::parse_colon(text).ok_or("info block too short for name and id")
    }

    /// Parse `name : id : cparam : fparam`
    ///
    /// `name` and `id` are required; the parameter blobs may be missing.
    /// Returns `None` when a required field is absent or the name is empty.
    pub fn parse_colon(text: &str) -> Option<Self> {
        let mut fields = text.splitn(4, INFO_SEPARATOR);
        let name = fields.next()?.trim();
        let id = fields.next()?.trim();
        if name.is_empty() {
            return None;
        }
        let parameters = decode_parameters(fields.next().unwrap_or(""));
        let force_parameters = decode_parameters(fields.next().unwrap_or(""));
        Some(Self {
            name: name.to_string(),
            id: id.to_string(),
            parameters,
            force_parameters,
        })
    }

    /// Render back into the info string form
    pub fn encode(&self) -> String {
        format!(
            "{} {sep} {} {sep} {} {sep} {}",
            self.name,
            self.id,
            encode_parameters(&self.parameters),
            encode_parameters(&self.force_parameters),
            sep = INFO_SEPARATOR,
        )
    }
}

/// Decoded component header
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentHeader {
    /// Raw magic word, `None` for legacy dumps
    pub magic: Option<u32>,
    /// Float width of the component's records
    pub precision: Precision,
    /// Number of particle records
    pub particle_count: u32,
    /// Extra integer attributes per record
    pub int_attr_count: u32,
    /// Extra floating attributes per record
    pub float_attr_count: u32,
    /// Declared length of the info block in bytes
    pub info_len: u32,
    /// Decoded info block
    pub info: ComponentInfo,
}

impl ComponentHeader {
    /// Decode the component header at the cursor
    ///
    /// `component` is the zero-based component position, used in errors.
    /// On success the cursor sits on the first particle record.
    pub fn decode(cursor: &mut ByteCursor<'_>, component: usize) -> Result<Self> {
        let malformed = |reason: &'static str| PspError::MalformedHeader { component, reason };

        let first = cursor.peek_u32()?;
        let (magic, precision) = if first & COMPONENT_MAGIC_MASK == COMPONENT_MAGIC {
            cursor.read_u32()?;
            let width = first & !COMPONENT_MAGIC_MASK;
            let precision =
                Precision::from_width(width).ok_or(malformed("unsupported float width in magic"))?;
            let rsize = cursor.read_u32()?;
            if rsize != width {
                return Err(malformed("record size disagrees with magic"));
            }
            (Some(first), precision)
        } else {
            (None, Precision::Double)
        };

        let particle_count = non_negative(cursor.read_i32()?)
            .ok_or(malformed("negative particle count"))?;
        let int_attr_count = non_negative(cursor.read_i32()?)
            .ok_or(malformed("negative integer attribute count"))?;
        let float_attr_count = non_negative(cursor.read_i32()?)
            .ok_or(malformed("negative float attribute count"))?;
        if int_attr_count.saturating_add(float_attr_count) > MAX_ATTRIBUTES {
            return Err(malformed("too many attributes per record"));
        }

        let info_len = cursor.read_u32()?;
        if info_len == 0 {
            return Err(malformed("empty info block"));
        }
        let text = cursor.read_fixed_string(info_len as usize)?;
        let info = ComponentInfo::parse(&text).map_err(malformed)?;

        Ok(Self {
            magic,
            precision,
            particle_count,
            int_attr_count,
            float_attr_count,
            info_len,
            info,
        })
    }

    /// Whether records carry the leading i64 sequence index
    ///
    /// Records are indexed only when the `indexing` parameter is true.
    pub fn is_indexed(&self) -> bool {
        self.info
            .parameters
            .get(INDEXING_PARAM)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Resolve the record layout for this component
    pub fn layout(&self) -> RecordLayout {
        RecordLayout::resolve(
            self.int_attr_count,
            self.float_attr_count,
            self.precision,
            self.is_indexed(),
        )
    }

    /// Encoded size of the header in bytes
    pub fn encoded_len(&self) -> usize {
        let preamble = if self.magic.is_some() { 24 } else { 16 };
        preamble + self.info_len as usize
    }

    /// Convert to bytes
    ///
    /// The info block is written as `info_len` bytes: the encoded info text,
    /// NUL padded when shorter, cut when longer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        if let Some(magic) = self.magic {
            bytes.extend_from_slice(&magic.to_le_bytes());
            bytes.extend_from_slice(&(self.precision.size_bytes() as u32).to_le_bytes());
        }
        bytes.extend_from_slice(&(self.particle_count as i32).to_le_bytes());
        bytes.extend_from_slice(&(self.int_attr_count as i32).to_le_bytes());
        bytes.extend_from_slice(&(self.float_attr_count as i32).to_le_bytes());
        bytes.extend_from_slice(&self.info_len.to_le_bytes());

        let text = self.info.encode();
        let mut block = text.into_bytes();
        block.resize(self.info_len as usize, 0);
        bytes.extend_from_slice(&block);
        bytes
    }
}

/// Whether an info block is YAML rather than the colon form
fn is_yaml(text: &str) -> bool {
    let text = text.trim();
    text.starts_with("---") || text.starts_with('{') || text.contains('\n')
}

fn non_negative(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamValue;
    use alloc::vec;

    fn preamble(magic: Option<(u32, u32)>, counts: [i32; 3], info: &[u8]) -> Vec<u8> {
        let mut bytes = vec![];
        if let Some((m, r)) = magic {
            bytes.extend_from_slice(&m.to_le_bytes());
            bytes.extend_from_slice(&r.to_le_bytes());
        }
        for c in counts {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
        bytes.extend_from_slice(&(info.len() as u32).to_le_bytes());
        bytes.extend_from_slice(info);
        bytes
    }

    #[test]
    fn test_global_header() {
        let header = GlobalHeader {
            time: 2.5,
            total_bodies: 1000,
            component_count: 2,
        };
        let bytes = header.to_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(GlobalHeader::decode(&mut cursor), Ok(header));
        assert_eq!(cursor.position(), GlobalHeader::SIZE);
    }

    #[test]
    fn test_decode_single_precision() {
        let bytes = preamble(
            Some((0xADBF_ABC4, 4)),
            [10, 2, 1],
            b"dark halo : sphereSL : nlevel=1,EJ=2 : lmax=4",
        );
        let mut cursor = ByteCursor::new(&bytes);
        let header = ComponentHeader::decode(&mut cursor, 0).unwrap();
        assert_eq!(header.magic, Some(0xADBF_ABC4));
        assert_eq!(header.precision, Precision::Single);
        assert_eq!(header.particle_count, 10);
        assert_eq!(header.int_attr_count, 2);
        assert_eq!(header.float_attr_count, 1);
        assert_eq!(header.info.name, "dark halo");
        assert_eq!(header.info.id, "sphereSL");
        assert_eq!(header.info.parameters.get("EJ"), Some(&ParamValue::Int(2)));
        assert_eq!(
            header.info.force_parameters.get("lmax"),
            Some(&ParamValue::Int(4))
        );
        assert!(cursor.at_end());
        assert_eq!(header.encoded_len(), bytes.len());
    }

    #[test]
    fn test_decode_legacy_is_double() {
        let bytes = preamble(None, [3, 0, 0], b"disk : cylinder\0\0\0");
        let mut cursor = ByteCursor::new(&bytes);
        let header = ComponentHeader::decode(&mut cursor, 0).unwrap();
        assert_eq!(header.magic, None);
        assert_eq!(header.precision, Precision::Double);
        assert!(header.info.parameters.is_empty());
        assert!(cursor.at_end());
    }

    #[test]
    fn test_negative_counts_are_malformed() {
        let bytes = preamble(Some((0xADBF_ABC8, 8)), [5, -1, 0], b"a : b");
        assert_eq!(
            ComponentHeader::decode(&mut ByteCursor::new(&bytes), 3),
            Err(PspError::MalformedHeader {
                component: 3,
                reason: "negative integer attribute count"
            })
        );
    }

    #[test]
    fn test_magic_disagreement_is_malformed() {
        let bytes = preamble(Some((0xADBF_ABC4, 8)), [5, 0, 0], b"a : b");
        assert!(matches!(
            ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0),
            Err(PspError::MalformedHeader { .. })
        ));
        let bytes = preamble(Some((0xADBF_ABC6, 6)), [5, 0, 0], b"a : b");
        assert!(matches!(
            ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0),
            Err(PspError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_short_info_block_is_malformed() {
        // The declared length cuts the info text before the id field.
        let mut bytes = preamble(Some((0xADBF_ABC4, 4)), [1, 0, 0], b"star");
        bytes.extend_from_slice(b" disk : cylinder");
        assert_eq!(
            ComponentHeader::decode(&mut ByteCursor::new(&bytes), 1),
            Err(PspError::MalformedHeader {
                component: 1,
                reason: "info block too short for name and id"
            })
        );
    }

    #[test]
    fn test_indexing_parameter() {
        let bytes = preamble(Some((0xADBF_ABC4, 4)), [1, 0, 0], b"a : b : indexing=true");
        let header = ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0).unwrap();
        assert!(header.is_indexed());
        assert_eq!(header.layout().stride(), 40);

        for info in [&b"a : b : indexing=0"[..], b"a : b"] {
            let bytes = preamble(Some((0xADBF_ABC4, 4)), [1, 0, 0], info);
            let header = ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0).unwrap();
            assert!(!header.is_indexed());
            assert_eq!(header.layout().stride(), 32);
        }
    }

    #[test]
    fn test_attribute_counts_are_bounded() {
        let bytes = preamble(Some((0xADBF_ABC8, 8)), [0, i32::MAX, 0], b"halo : sphereSL");
        assert_eq!(
            ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0),
            Err(PspError::MalformedHeader {
                component: 0,
                reason: "too many attributes per record"
            })
        );

        let bytes = preamble(Some((0xADBF_ABC8, 8)), [0, 4000, 96], b"halo : sphereSL");
        let header = ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0).unwrap();
        assert_eq!(header.layout().width(), 8 + 4096);
    }

    const YAML_INFO: &[u8] =
        b"name: dark halo\nid: sphereSL\nparameters: {indexing: true, nlevel: 1}\nforce: {Lmax: 4}";

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_info_block() {
        let bytes = preamble(Some((0xADBF_ABC4, 4)), [2, 0, 0], YAML_INFO);
        let mut cursor = ByteCursor::new(&bytes);
        let header = ComponentHeader::decode(&mut cursor, 0).unwrap();
        assert!(cursor.at_end());
        assert_eq!(header.info.name, "dark halo");
        assert_eq!(header.info.id, "sphereSL");
        assert!(header.is_indexed());
        assert_eq!(header.layout().stride(), 40);
        assert_eq!(header.info.force_parameters.get("Lmax"), Some(&ParamValue::Int(4)));
    }

    #[cfg(not(feature = "yaml"))]
    #[test]
    fn test_yaml_info_block_needs_feature() {
        let bytes = preamble(Some((0xADBF_ABC4, 4)), [2, 0, 0], YAML_INFO);
        assert_eq!(
            ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0),
            Err(PspError::MalformedHeader {
                component: 0,
                reason: "YAML info block needs the yaml feature"
            })
        );
    }

    #[test]
    fn test_colon_form_is_not_yaml() {
        assert!(!is_yaml("dark halo : sphereSL : indexing=1 : "));
        assert!(is_yaml("name: halo\nid: sphereSL"));
        assert!(is_yaml("{name: halo, id: sphereSL}"));
        assert!(is_yaml("---\nname: halo"));
    }

    #[test]
    fn test_header_to_bytes_roundtrip() {
        let bytes = preamble(
            Some((0xADBF_ABC8, 8)),
            [4, 1, 2],
            b"stars : cylinder : indexing=1,nlevel=2 : acyl=0.01",
        );
        let header = ComponentHeader::decode(&mut ByteCursor::new(&bytes), 0).unwrap();
        let encoded = header.to_bytes();
        assert_eq!(encoded.len(), header.encoded_len());
        let decoded = ComponentHeader::decode(&mut ByteCursor::new(&encoded), 0).unwrap();
        assert_eq!(decoded, header);
    }
}
