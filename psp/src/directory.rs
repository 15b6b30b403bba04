//! Component directory and the scanner that builds it
//!
//! The scanner walks a dump once: global header, then each component
//! header. Record blocks are skipped, not decoded, so opening a file with
//! many large components costs one pass over the headers.

use hashbrown::HashMap;
use log::{debug, trace, warn};
use psp_core::{
    validate_block, ByteCursor, ComponentHeader, GlobalHeader, ParamValue, Parameters, Precision,
    PspError, RecordLayout,
};
use std::ops::Range;

use crate::error::ScanError;
use crate::ReadOptions;

/// Metadata and byte range of one component
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComponentDescriptor {
    /// Component name, unique within the file
    pub name: String,
    /// Force / model identifier
    pub id: String,
    /// Zero-based position in the file
    pub index: usize,
    pub particle_count: u32,
    pub int_attr_count: u32,
    pub float_attr_count: u32,
    pub precision: Precision,
    /// Raw magic word, `None` for legacy dumps
    pub magic: Option<u32>,
    pub parameters: Parameters,
    pub force_parameters: Parameters,
    /// Absolute offset of the component header
    pub header_offset: usize,
    /// Encoded header length in bytes
    pub header_len: usize,
    /// Absolute offset of the first particle record
    pub data_offset: usize,
    pub layout: RecordLayout,
}

impl ComponentDescriptor {
    fn new(index: usize, header_offset: usize, data_offset: usize, header: ComponentHeader) -> Self {
        let layout = header.layout();
        let ComponentHeader {
            magic,
            precision,
            particle_count,
            int_attr_count,
            float_attr_count,
            info,
            ..
        } = header;

        Self {
            name: info.name,
            id: info.id,
            index,
            particle_count,
            int_attr_count,
            float_attr_count,
            precision,
            magic,
            parameters: info.parameters,
            force_parameters: info.force_parameters,
            header_offset,
            header_len: data_offset - header_offset,
            data_offset,
            layout,
        }
    }

    /// Bytes per particle record
    pub fn record_stride(&self) -> usize {
        self.layout.stride()
    }

    /// Byte length of the record block
    pub fn data_len(&self) -> usize {
        self.particle_count as usize * self.record_stride()
    }

    /// Absolute byte range of the record block
    pub fn data_range(&self) -> Range<usize> {
        self.data_offset..self.data_offset + self.data_len()
    }

    /// Whether records carry the i64 sequence index
    pub fn is_indexed(&self) -> bool {
        self.layout.is_indexed()
    }

    /// Look up a component parameter
    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }
}

/// Global header plus the ordered component descriptors of one dump
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComponentDirectory {
    global: Option<GlobalHeader>,
    components: Vec<ComponentDescriptor>,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_name: HashMap<String, usize>,
}

impl ComponentDirectory {
    /// Global header, `None` only when the scan failed before reading it
    pub fn global_header(&self) -> Option<&GlobalHeader> {
        self.global.as_ref()
    }

    /// Simulation time of the dump
    pub fn time(&self) -> f64 {
        self.global.map_or(0.0, |g| g.time)
    }

    /// Component count declared by the global header
    pub fn declared_components(&self) -> usize {
        self.global.map_or(0, |g| g.component_count as usize)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Descriptors in file order
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    /// Component names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.components.iter().map(|c| c.name.as_str())
    }

    /// Find a component by name
    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.by_name.get(name).map(|&i| &self.components[i])
    }

    /// Find a component by position
    pub fn get_index(&self, index: usize) -> Option<&ComponentDescriptor> {
        self.components.get(index)
    }

    /// Sum of the particle counts of all components
    pub fn total_bodies(&self) -> u64 {
        self.components.iter().map(|c| c.particle_count as u64).sum()
    }

    fn push(&mut self, descriptor: ComponentDescriptor) -> Result<(), PspError> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(PspError::DuplicateComponent(descriptor.name));
        }
        self.by_name
            .insert(descriptor.name.clone(), self.components.len());
        self.components.push(descriptor);
        Ok(())
    }
}

/// Smallest encoded component header: legacy preamble with no info text
const MIN_COMPONENT_HEADER: usize = 16;

/// Scanner states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ReadingGlobalHeader,
    ReadingComponent(usize),
    Done,
}

/// Single-pass directory scanner over a complete dump
pub struct DirectoryScanner<'a> {
    cursor: ByteCursor<'a>,
    state: ScanState,
    options: &'a ReadOptions,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(data: &'a [u8], options: &'a ReadOptions) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            state: ScanState::ReadingGlobalHeader,
            options,
        }
    }

    /// Run the scan to completion
    ///
    /// On failure the error carries every component decoded so far.
    pub fn scan(mut self) -> Result<ComponentDirectory, ScanError> {
        let mut directory = ComponentDirectory::default();
        match self.run(&mut directory) {
            Ok(()) => Ok(directory),
            Err(source) => Err(ScanError {
                source,
                partial: Box::new(directory),
            }),
        }
    }

    fn run(&mut self, directory: &mut ComponentDirectory) -> Result<(), PspError> {
        while self.state != ScanState::Done {
            self.state = match self.state {
                ScanState::ReadingGlobalHeader => self.read_global(directory)?,
                ScanState::ReadingComponent(index) => self.read_component(index, directory)?,
                ScanState::Done => ScanState::Done,
            };
        }
        self.check_totals(directory)
    }

    fn read_global(&mut self, directory: &mut ComponentDirectory) -> Result<ScanState, PspError> {
        let global = GlobalHeader::decode(&mut self.cursor)?;
        debug!(
            "PSP dump at t={} declares {} components, {} bodies",
            global.time, global.component_count, global.total_bodies
        );
        directory.global = Some(global);
        let fit = self.cursor.remaining() / MIN_COMPONENT_HEADER;
        directory
            .components
            .reserve((global.component_count as usize).min(fit));

        Ok(if global.component_count == 0 {
            ScanState::Done
        } else {
            ScanState::ReadingComponent(0)
        })
    }

    fn read_component(
        &mut self,
        index: usize,
        directory: &mut ComponentDirectory,
    ) -> Result<ScanState, PspError> {
        let declared = directory.declared_components();
        let end_of_file = PspError::UnexpectedEndOfFile {
            declared,
            decoded: index,
        };
        if self.cursor.at_end() {
            return Err(end_of_file);
        }

        let header_offset = self.cursor.position();
        let header = match ComponentHeader::decode(&mut self.cursor, index) {
            Ok(header) => header,
            Err(PspError::TruncatedInput { .. }) => return Err(end_of_file),
            Err(e) => return Err(e),
        };
        let descriptor =
            ComponentDescriptor::new(index, header_offset, self.cursor.position(), header);

        let end = match validate_block(
            descriptor.data_offset,
            descriptor.particle_count,
            descriptor.record_stride(),
            self.cursor.len(),
        ) {
            Ok(end) => end,
            Err(PspError::TruncatedInput { .. }) => return Err(end_of_file),
            Err(e) => return Err(e),
        };
        self.cursor.seek(end)?;

        trace!(
            "component {index} '{}': {} bodies, stride {}, records at {:?}",
            descriptor.name,
            descriptor.particle_count,
            descriptor.record_stride(),
            descriptor.data_range()
        );
        for (key, value) in &descriptor.parameters {
            if *value == ParamValue::Str(String::new()) {
                debug!("component '{}': parameter '{key}' has no value", descriptor.name);
            }
        }

        directory.push(descriptor)?;

        Ok(if index + 1 == declared {
            ScanState::Done
        } else {
            ScanState::ReadingComponent(index + 1)
        })
    }

    fn check_totals(&self, directory: &ComponentDirectory) -> Result<(), PspError> {
        if !self.cursor.at_end() {
            let offset = self.cursor.position();
            let len = self.cursor.remaining();
            if self.options.strict {
                return Err(PspError::TrailingData { offset, len });
            }
            warn!("ignoring {len} trailing bytes at offset {offset}");
        }

        let declared = directory.global.map_or(0, |g| g.total_bodies as u64);
        let actual = directory.total_bodies();
        if declared != actual {
            if self.options.strict {
                return Err(PspError::BodyCountMismatch { declared, actual });
            }
            warn!("global header declares {declared} bodies, components hold {actual}");
        }
        Ok(())
    }
}

/// Scan `data` into a component directory
pub fn scan(data: &[u8], options: &ReadOptions) -> Result<ComponentDirectory, ScanError> {
    DirectoryScanner::new(data, options).scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{ComponentBuilder, Particle, PspWriter};

    fn two_component_dump() -> Vec<u8> {
        PspWriter::new(1.25)
            .component(
                ComponentBuilder::new("dark halo", "sphereSL")
                    .precision(Precision::Single)
                    .parameter("nlevel", ParamValue::Int(1))
                    .particles((0..5).map(Particle::at_rest)),
            )
            .component(
                ComponentBuilder::new("star disk", "cylinder")
                    .attributes(2, 1)
                    .particles((0..3).map(|i| Particle::at_rest(i).with_attrs(vec![1, 2], vec![0.5]))),
            )
            .to_bytes()
            .unwrap()
    }

    #[test]
    fn test_scan_offsets_cover_file() {
        let bytes = two_component_dump();
        let dir = scan(&bytes, &ReadOptions::strict()).unwrap();

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.time(), 1.25);
        assert_eq!(dir.names().collect::<Vec<_>>(), ["dark halo", "star disk"]);

        let covered: usize = GlobalHeader::SIZE
            + dir
                .components()
                .iter()
                .map(|c| c.header_len + c.data_len())
                .sum::<usize>();
        assert_eq!(covered, bytes.len());

        let halo = dir.get("dark halo").unwrap();
        assert_eq!(halo.index, 0);
        assert_eq!(halo.header_offset, GlobalHeader::SIZE);
        assert_eq!(halo.record_stride(), 8 * 4);
        let disk = dir.get("star disk").unwrap();
        assert_eq!(disk.index, 1);
        assert_eq!(disk.header_offset, halo.data_range().end);
        assert_eq!(disk.record_stride(), 8 * 8 + 2 * 4 + 8);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let bytes = two_component_dump();
        let options = ReadOptions::default();
        let first = scan(&bytes, &options).unwrap();
        let second = scan(&bytes, &options).unwrap();
        assert_eq!(first.components(), second.components());
    }

    #[test]
    fn test_missing_component_reports_partial() {
        let mut bytes = two_component_dump();
        // Claim a third component that is not there
        bytes[12..16].copy_from_slice(&3u32.to_le_bytes());

        let err = scan(&bytes, &ReadOptions::default()).unwrap_err();
        assert_eq!(
            err.kind(),
            &PspError::UnexpectedEndOfFile {
                declared: 3,
                decoded: 2
            }
        );
        assert_eq!(err.partial().len(), 2);
    }

    #[test]
    fn test_truncated_record_block_is_end_of_file() {
        let bytes = two_component_dump();
        let cut = &bytes[..bytes.len() - 1];
        let err = scan(cut, &ReadOptions::default()).unwrap_err();
        assert_eq!(
            err.kind(),
            &PspError::UnexpectedEndOfFile {
                declared: 2,
                decoded: 1
            }
        );
        assert_eq!(err.partial().names().collect::<Vec<_>>(), ["dark halo"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let bytes = PspWriter::new(0.0)
            .component(ComponentBuilder::new("halo", "sphereSL"))
            .component(ComponentBuilder::new("halo", "cylinder"))
            .to_bytes_unchecked();
        let err = scan(&bytes, &ReadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &PspError::DuplicateComponent("halo".into()));
        assert_eq!(err.partial().len(), 1);
    }

    #[test]
    fn test_short_header_length_is_malformed() {
        let mut bytes = two_component_dump();
        let dir = scan(&bytes, &ReadOptions::default()).unwrap();
        // Shrink the first component's declared info length so it ends
        // inside the name field
        let ninfochar_at = dir.components()[0].header_offset + 20;
        bytes[ninfochar_at..ninfochar_at + 4].copy_from_slice(&3u32.to_le_bytes());

        let err = scan(&bytes, &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err.kind(),
            PspError::MalformedHeader { component: 0, .. }
        ));
        assert!(err.partial().is_empty());
    }

    fn component_bytes(magic: u32, counts: [i32; 3], info: &[u8]) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(&magic.to_le_bytes());
        bytes.extend_from_slice(&(magic & 0xF).to_le_bytes());
        for count in counts {
            bytes.extend_from_slice(&count.to_le_bytes());
        }
        bytes.extend_from_slice(&(info.len() as u32).to_le_bytes());
        bytes.extend_from_slice(info);
        bytes
    }

    fn global_bytes(total_bodies: u32, component_count: u32) -> Vec<u8> {
        GlobalHeader {
            time: 0.0,
            total_bodies,
            component_count,
        }
        .to_bytes()
        .to_vec()
    }

    #[test]
    fn test_huge_component_count_is_end_of_file() {
        let bytes = global_bytes(0, u32::MAX);
        let err = scan(&bytes, &ReadOptions::default()).unwrap_err();
        assert_eq!(
            err.kind(),
            &PspError::UnexpectedEndOfFile {
                declared: u32::MAX as usize,
                decoded: 0
            }
        );
        assert!(err.partial().is_empty());
    }

    #[test]
    fn test_huge_attribute_count_is_malformed() {
        let mut bytes = global_bytes(0, 1);
        bytes.extend(component_bytes(0xADBF_ABC8, [0, i32::MAX, 0], b"halo : sphereSL"));
        let err = scan(&bytes, &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err.kind(),
            PspError::MalformedHeader { component: 0, .. }
        ));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_info_block_sets_stride() {
        let mut bytes = global_bytes(2, 1);
        bytes.extend(component_bytes(
            0xADBF_ABC4,
            [2, 0, 0],
            b"name: dark halo\nid: sphereSL\nparameters: {indexing: true, nlevel: 1}\nforce: {Lmax: 4}",
        ));
        bytes.extend_from_slice(&[0u8; 2 * 40]);

        let dir = scan(&bytes, &ReadOptions::strict()).unwrap();
        let halo = dir.get("dark halo").unwrap();
        assert_eq!(halo.id, "sphereSL");
        assert!(halo.is_indexed());
        assert_eq!(halo.record_stride(), 40);
        assert_eq!(halo.parameter("nlevel"), Some(&ParamValue::Int(1)));
        assert_eq!(halo.force_parameters.get("Lmax"), Some(&ParamValue::Int(4)));
        assert_eq!(halo.data_range().end, bytes.len());
    }

    #[test]
    fn test_trailing_data() {
        let mut bytes = two_component_dump();
        bytes.extend_from_slice(&[0u8; 7]);

        assert_eq!(scan(&bytes, &ReadOptions::default()).unwrap().len(), 2);
        let err = scan(&bytes, &ReadOptions::strict()).unwrap_err();
        assert_eq!(
            err.kind(),
            &PspError::TrailingData {
                offset: bytes.len() - 7,
                len: 7
            }
        );
    }

    #[test]
    fn test_body_count_mismatch() {
        let mut bytes = two_component_dump();
        bytes[8..12].copy_from_slice(&99u32.to_le_bytes());

        assert!(scan(&bytes, &ReadOptions::default()).is_ok());
        let err = scan(&bytes, &ReadOptions::strict()).unwrap_err();
        assert_eq!(
            err.kind(),
            &PspError::BodyCountMismatch {
                declared: 99,
                actual: 8
            }
        );
    }

    #[test]
    fn test_empty_dump() {
        let bytes = PspWriter::new(3.0).to_bytes().unwrap();
        let dir = scan(&bytes, &ReadOptions::strict()).unwrap();
        assert!(dir.is_empty());
        assert_eq!(dir.time(), 3.0);

        let err = scan(&bytes[..10], &ReadOptions::default()).unwrap_err();
        assert!(matches!(err.kind(), PspError::TruncatedInput { .. }));
        assert!(err.partial().global_header().is_none());
    }
}
