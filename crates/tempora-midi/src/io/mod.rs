//! Hardware MIDI output.
//!
//! Port enumeration and connection via midir. Requires the `midi-io` feature.

mod output;

pub use output::{list_output_ports, MidirDevice, MidirSink, MidiOutputPortInfo, PortSelector};
