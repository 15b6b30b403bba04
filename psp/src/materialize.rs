//! Lazy decoding of a component's particle records
//!
//! Only the byte range recorded for the component during the directory
//! scan is read. Either every requested record decodes or the call fails.

use log::debug;
use psp_core::{block_len, ByteCursor, Result};

use crate::directory::ComponentDescriptor;
use crate::table::{Column, ParticleTable};

/// Decode up to `limit` records of `descriptor` from `data`
pub fn materialize(
    data: &[u8],
    descriptor: &ComponentDescriptor,
    limit: usize,
) -> Result<ParticleTable> {
    let rows = limit.min(descriptor.particle_count as usize);
    let layout = &descriptor.layout;
    let stride = layout.stride();

    let mut cursor = ByteCursor::new(data);
    cursor.seek(descriptor.data_offset)?;
    let block = cursor.read_bytes(block_len(rows as u32, stride)?)?;

    let columns = layout
        .fields()
        .iter()
        .map(|field| {
            (
                field.name.clone(),
                Column::decode(field.kind, block, stride, field.offset),
            )
        })
        .collect();

    debug!(
        "decoded {rows} of {} records from component '{}'",
        descriptor.particle_count, descriptor.name
    );
    Ok(ParticleTable::new(descriptor.name.clone(), columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::scan;
    use crate::writer::{ComponentBuilder, Particle, PspWriter};
    use crate::ReadOptions;
    use psp_core::{ParamValue, Precision, PspError};

    fn dump_with(indexing: bool) -> Vec<u8> {
        let particles = (0..3).map(|i| Particle {
            index: 100 + i,
            mass: 0.5,
            pos: [i as f64, 2.0 * i as f64, -1.0],
            vel: [0.25, 0.0, i as f64],
            pot: -3.5,
            int_attrs: vec![i as i32, 10 * i as i32],
            float_attrs: vec![1.5 * i as f64],
        });
        PspWriter::new(0.0)
            .component(
                ComponentBuilder::new("disk", "cylinder")
                    .precision(Precision::Single)
                    .parameter("indexing", ParamValue::Int(indexing as i64))
                    .attributes(2, 1)
                    .particles(particles),
            )
            .to_bytes()
            .unwrap()
    }

    fn dump() -> Vec<u8> {
        dump_with(false)
    }

    #[test]
    fn test_eleven_columns() {
        let bytes = dump();
        let dir = scan(&bytes, &ReadOptions::default()).unwrap();
        let disk = dir.get("disk").unwrap();
        assert_eq!(disk.record_stride(), 8 * 4 + 2 * 4 + 4);
        assert_eq!(disk.data_len(), 3 * disk.record_stride());

        let table = materialize(&bytes, disk, usize::MAX).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.width(), 8 + 2 + 1);
        assert_eq!(
            table.names(),
            ["m", "x", "y", "z", "vx", "vy", "vz", "potE", "i_attr0", "i_attr1", "f_attr0"]
        );
        assert!(table.column("index").is_none());
        assert_eq!(table.column("y").unwrap().as_f32(), Some(&[0.0, 2.0, 4.0][..]));
        assert_eq!(table.column("i_attr1").unwrap().as_i32(), Some(&[0, 10, 20][..]));
        assert_eq!(table.column("f_attr0").unwrap().as_f32(), Some(&[0.0, 1.5, 3.0][..]));
        for (_, column) in table.columns() {
            assert_eq!(column.len(), 3);
        }
    }

    #[test]
    fn test_indexed_records() {
        let bytes = dump_with(true);
        let dir = scan(&bytes, &ReadOptions::default()).unwrap();
        let disk = dir.get("disk").unwrap();
        assert!(disk.is_indexed());
        assert_eq!(disk.record_stride(), 8 + 8 * 4 + 2 * 4 + 4);

        let table = materialize(&bytes, disk, usize::MAX).unwrap();
        assert_eq!(table.width(), 12);
        assert_eq!(table.names()[0], "index");
        assert_eq!(table.column("index").unwrap().as_i64(), Some(&[100, 101, 102][..]));
        assert_eq!(table.column("potE").unwrap().as_f32(), Some(&[-3.5; 3][..]));
    }

    #[test]
    fn test_limit() {
        let bytes = dump();
        let dir = scan(&bytes, &ReadOptions::default()).unwrap();
        let table = materialize(&bytes, dir.get("disk").unwrap(), 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("vz").unwrap().as_f32(), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn test_truncated_source() {
        let bytes = dump();
        let dir = scan(&bytes, &ReadOptions::default()).unwrap();
        let disk = dir.get("disk").unwrap();
        let err = materialize(&bytes[..bytes.len() - 4], disk, usize::MAX).unwrap_err();
        assert!(matches!(err, PspError::TruncatedInput { .. }));

        let err = materialize(&bytes[..disk.data_offset - 1], disk, usize::MAX).unwrap_err();
        assert!(matches!(err, PspError::OutOfBounds { .. }));
    }

    #[test]
    fn test_reload_is_byte_identical() {
        let bytes = dump();
        let dir = scan(&bytes, &ReadOptions::default()).unwrap();
        let disk = dir.get("disk").unwrap();
        let first = materialize(&bytes, disk, usize::MAX).unwrap();
        let second = materialize(&bytes, disk, usize::MAX).unwrap();
        for ((_, a), (_, b)) in first.columns().zip(second.columns()) {
            assert_eq!(a.as_bytes(), b.as_bytes());
        }
    }
}
