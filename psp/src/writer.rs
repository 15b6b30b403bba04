//! Writing PSP dumps
//!
//! Produces the same layout the reader consumes: a global header followed
//! by each component header and its record block. Records are encoded in
//! parallel with rayon, one buffer per component.

use hashbrown::HashSet;
use log::debug;
use psp_core::format::constants::{INFO_SEPARATOR, MAX_ATTRIBUTES, PARAM_SEPARATOR};
use psp_core::{ComponentHeader, ComponentInfo, GlobalHeader, ParamValue, Parameters, Precision};
use rayon::prelude::*;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Error, Result};

/// One particle to be written
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Sequence index, written only for indexed components
    pub index: i64,
    pub mass: f64,
    pub pos: [f64; 3],
    pub vel: [f64; 3],
    /// Potential energy
    pub pot: f64,
    pub int_attrs: Vec<i32>,
    pub float_attrs: Vec<f64>,
}

impl Particle {
    /// Unit mass particle at the origin with no velocity
    pub fn at_rest(index: i64) -> Self {
        Self {
            index,
            mass: 1.0,
            pos: [0.0; 3],
            vel: [0.0; 3],
            pot: 0.0,
            int_attrs: Vec::new(),
            float_attrs: Vec::new(),
        }
    }

    pub fn with_attrs(mut self, int_attrs: Vec<i32>, float_attrs: Vec<f64>) -> Self {
        self.int_attrs = int_attrs;
        self.float_attrs = float_attrs;
        self
    }

    fn encode(&self, precision: Precision, indexed: bool, out: &mut Vec<u8>) {
        if indexed {
            out.extend_from_slice(&self.index.to_le_bytes());
        }
        let core = [
            self.mass,
            self.pos[0],
            self.pos[1],
            self.pos[2],
            self.vel[0],
            self.vel[1],
            self.vel[2],
            self.pot,
        ];
        for value in core {
            put_float(out, value, precision);
        }
        for value in &self.int_attrs {
            out.extend_from_slice(&value.to_le_bytes());
        }
        for &value in &self.float_attrs {
            put_float(out, value, precision);
        }
    }
}

fn put_float(out: &mut Vec<u8>, value: f64, precision: Precision) {
    match precision {
        Precision::Single => out.extend_from_slice(&(value as f32).to_le_bytes()),
        Precision::Double => out.extend_from_slice(&value.to_le_bytes()),
    }
}

/// Reject text that would not read back as written from an info string
fn check_text(text: &str, reserved: &[char]) -> Result<()> {
    let problem = if text.trim() != text {
        Some("leading or trailing whitespace")
    } else if text.contains(['\n', '\r']) {
        Some("a line break")
    } else if text.contains(reserved) {
        Some("a reserved separator")
    } else {
        None
    };
    match problem {
        Some(problem) => Err(Error::InvalidInput(format!("'{text}' contains {problem}"))),
        None => Ok(()),
    }
}

fn check_parameter(key: &str, value: &ParamValue) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("empty parameter key".into()));
    }
    check_text(key, &[INFO_SEPARATOR, PARAM_SEPARATOR, '='])?;
    match value {
        ParamValue::Int(_) => Ok(()),
        ParamValue::Float(v) if v.is_finite() => Ok(()),
        ParamValue::Float(v) => Err(Error::InvalidInput(format!(
            "parameter '{key}' has non-finite value {v}"
        ))),
        ParamValue::Str(s) => {
            check_text(s, &[INFO_SEPARATOR, PARAM_SEPARATOR])?;
            if !s.is_empty() && ParamValue::infer(s) != *value {
                return Err(Error::InvalidInput(format!(
                    "text parameter '{key}={s}' would read back as a number"
                )));
            }
            Ok(())
        }
    }
}

/// Builder for one component of a dump
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    name: String,
    id: String,
    precision: Precision,
    legacy: bool,
    parameters: Parameters,
    force_parameters: Parameters,
    int_attr_count: u32,
    float_attr_count: u32,
    particles: Vec<Particle>,
}

impl ComponentBuilder {
    /// Empty double precision component
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            precision: Precision::Double,
            legacy: false,
            parameters: Parameters::new(),
            force_parameters: Parameters::new(),
            int_attr_count: 0,
            float_attr_count: 0,
            particles: Vec::new(),
        }
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Omit the magic word, as dumps from old EXP versions do
    ///
    /// Legacy components must be double precision.
    pub fn legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn force_parameter(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.force_parameters.insert(key.into(), value);
        self
    }

    /// Number of extra integer and float attributes per particle
    pub fn attributes(mut self, int_attr_count: u32, float_attr_count: u32) -> Self {
        self.int_attr_count = int_attr_count;
        self.float_attr_count = float_attr_count;
        self
    }

    pub fn particle(mut self, particle: Particle) -> Self {
        self.particles.push(particle);
        self
    }

    pub fn particles<I: IntoIterator<Item = Particle>>(mut self, particles: I) -> Self {
        self.particles.extend(particles);
        self
    }

    fn header(&self) -> ComponentHeader {
        let info = ComponentInfo {
            name: self.name.clone(),
            id: self.id.clone(),
            parameters: self.parameters.clone(),
            force_parameters: self.force_parameters.clone(),
        };
        let info_len = info.encode().len() as u32;
        ComponentHeader {
            magic: (!self.legacy).then(|| self.precision.magic()),
            precision: self.precision,
            particle_count: self.particles.len() as u32,
            int_attr_count: self.int_attr_count,
            float_attr_count: self.float_attr_count,
            info_len,
            info,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::InvalidInput(msg)) };

        if self.name.is_empty() {
            return invalid("component name is empty".into());
        }
        for text in [&self.name, &self.id] {
            check_text(text, &[INFO_SEPARATOR])?;
        }
        if self.name.starts_with("---") || self.name.starts_with('{') {
            return invalid(format!("component name '{}' reads as YAML", self.name));
        }
        for (key, value) in self.parameters.iter().chain(&self.force_parameters) {
            check_parameter(key, value)?;
        }
        if self.legacy && self.precision != Precision::Double {
            return invalid(format!("legacy component '{}' must be double precision", self.name));
        }
        if i32::try_from(self.particles.len()).is_err() {
            return invalid(format!("component '{}' has too many particles", self.name));
        }
        if self.int_attr_count.saturating_add(self.float_attr_count) > MAX_ATTRIBUTES {
            return invalid(format!(
                "component '{}' has more than {MAX_ATTRIBUTES} attributes",
                self.name
            ));
        }
        let nint = self.int_attr_count as usize;
        let nfloat = self.float_attr_count as usize;
        if let Some(p) = self
            .particles
            .iter()
            .find(|p| p.int_attrs.len() != nint || p.float_attrs.len() != nfloat)
        {
            return invalid(format!(
                "particle {} of '{}' has {}+{} attributes, expected {nint}+{nfloat}",
                p.index,
                self.name,
                p.int_attrs.len(),
                p.float_attrs.len()
            ));
        }
        Ok(())
    }

    fn encode(&self) -> Vec<u8> {
        let header = self.header();
        let indexed = header.is_indexed();
        let stride = header.layout().stride();

        let mut bytes = header.to_bytes();
        let records = self
            .particles
            .par_iter()
            .map(|p| {
                let mut record = Vec::with_capacity(stride);
                p.encode(self.precision, indexed, &mut record);
                record
            })
            .collect::<Vec<_>>();
        bytes.reserve(records.len() * stride);
        for record in records {
            bytes.extend_from_slice(&record);
        }
        bytes
    }
}

/// Builder for a complete PSP dump
#[derive(Debug, Clone, Default)]
pub struct PspWriter {
    time: f64,
    components: Vec<ComponentBuilder>,
}

impl PspWriter {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            components: Vec::new(),
        }
    }

    /// Append a component
    pub fn component(mut self, component: ComponentBuilder) -> Self {
        self.components.push(component);
        self
    }

    /// Encode the dump after checking that it reads back unambiguously
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut names = HashSet::new();
        for component in &self.components {
            component.validate()?;
            if !names.insert(component.name.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate component name '{}'",
                    component.name
                )));
            }
        }
        Ok(self.to_bytes_unchecked())
    }

    /// Encode the dump as given, even if a reader would reject it
    pub fn to_bytes_unchecked(&self) -> Vec<u8> {
        let total_bodies: usize = self.components.iter().map(|c| c.particles.len()).sum();
        let global = GlobalHeader {
            time: self.time,
            total_bodies: total_bodies as u32,
            component_count: self.components.len() as u32,
        };

        let mut bytes = global.to_bytes().to_vec();
        for component in &self.components {
            bytes.extend_from_slice(&component.encode());
        }
        bytes
    }

    /// Encode and write the dump to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        out.write_all(&bytes)?;
        out.flush()?;
        debug!(
            "wrote {} bytes, {} components to {}",
            bytes.len(),
            self.components.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}
