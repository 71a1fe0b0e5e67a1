//! Waveform recording and VCD export.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use linked_hash_map::LinkedHashMap;

use crate::utils::bits_to_string;
use crate::{Signal, SimError};

#[derive(Debug)]
struct Probe {
    id: String,
    width: usize,
    /// `(cycle, value)`, recorded only when the value changes.
    changes: Vec<(u64, Vec<bool>)>,
}

/// Records the values of named probes over time.
///
/// Probes are dumped in declaration order.
#[derive(Debug)]
pub struct Waveform {
    scope: String,
    probes: LinkedHashMap<String, Probe>,
}

/// Returns the VCD identifier of the `index`-th probe.
fn vcd_id(mut index: usize) -> String {
    const BASE: usize = (b'~' - b'!' + 1) as usize;
    let mut id = String::new();
    loop {
        id.push(char::from(b'!' + (index % BASE) as u8));
        index /= BASE;
        if index == 0 {
            break id;
        }
        index -= 1;
    }
}

impl Waveform {
    /// Creates an empty waveform whose probes live in the VCD scope `scope`.
    pub fn new(scope: &str) -> Self { Self { scope: scope.to_string(), probes: LinkedHashMap::new() } }

    /// Declares a probe of the given width.
    pub fn declare(&mut self, name: &str, width: usize) -> Result<(), SimError> {
        if self.probes.contains_key(name) {
            return Err(SimError::DuplicateProbe(name.to_string()));
        }
        let id = vcd_id(self.probes.len());
        self.probes.insert(name.to_string(), Probe { id, width, changes: Vec::new() });
        Ok(())
    }

    /// Declares a probe as wide as `V`.
    pub fn declare_signal<V: Signal>(&mut self, name: &str) -> Result<(), SimError> { self.declare(name, V::WIDTH) }

    /// Records the bits of a probe at `cycle`.
    pub fn sample_bits(&mut self, cycle: u64, name: &str, bits: Vec<bool>) -> Result<(), SimError> {
        let probe = some_or!(self.probes.get_mut(name), return Err(SimError::UnknownProbe(name.to_string())));
        if bits.len() != probe.width {
            return Err(SimError::WidthMismatch { name: name.to_string(), expected: probe.width, actual: bits.len() });
        }
        match probe.changes.last_mut() {
            Some((_, last)) if *last == bits => {}
            Some((at, last)) if *at == cycle => *last = bits,
            _ => probe.changes.push((cycle, bits)),
        }
        Ok(())
    }

    /// Records the value of a probe at `cycle`.
    pub fn sample<V: Signal>(&mut self, cycle: u64, name: &str, value: V) -> Result<(), SimError> {
        self.sample_bits(cycle, name, value.transl())
    }

    /// Returns the value of a probe at `cycle`, or `None` if it was never sampled before.
    pub fn value_at(&self, name: &str, cycle: u64) -> Option<&[bool]> {
        let probe = self.probes.get(name)?;
        probe.changes.iter().take_while(|(at, _)| *at <= cycle).last().map(|(_, bits)| bits.as_slice())
    }

    /// Returns the declared probe names.
    pub fn probes(&self) -> impl Iterator<Item = &str> { self.probes.keys().map(String::as_str) }

    /// Writes the waveform in the Value Change Dump format, one time unit per cycle.
    pub fn write_vcd<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "$timescale 1ns $end")?;
        writeln!(w, "$scope module {} $end", self.scope)?;
        for (name, probe) in self.probes.iter() {
            writeln!(w, "$var wire {} {} {} $end", probe.width, probe.id, name)?;
        }
        writeln!(w, "$upscope $end")?;
        writeln!(w, "$enddefinitions $end")?;

        let changes = self
            .probes
            .values()
            .flat_map(|probe| probe.changes.iter().map(move |(at, bits)| (*at, probe, bits)))
            .sorted_by_key(|(at, ..)| *at);
        for (at, group) in &changes.group_by(|(at, ..)| *at) {
            writeln!(w, "#{}", at)?;
            for (_, probe, bits) in group {
                if probe.width == 1 {
                    writeln!(w, "{}{}", bits_to_string(bits), probe.id)?;
                } else {
                    writeln!(w, "b{} {}", bits_to_string(bits), probe.id)?;
                }
            }
        }
        Ok(())
    }

    /// Returns the waveform as a VCD string.
    pub fn to_vcd(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a `Vec` cannot fail.
        let _ = self.write_vcd(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Writes the waveform to a VCD file, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(path)?);
        self.write_vcd(&mut w)?;
        w.flush()?;
        Ok(())
    }
}
