//! Captured-buffer verification.
//!
//! Compares transform-feedback readbacks against the original input buffer
//! using the output→input vertex correspondence from [`crate::topology`].
//! Float components tolerate a small absolute error from varying
//! interpolation hardware; integer components must match bit for bit.

use tracing::warn;
use xfb_shadergen::{InputLayout, Output};

use crate::topology::{self, PrimitiveType};

/// Absolute tolerance for captured float components.
const FLOAT_THRESHOLD: f32 = 0.1;

/// Fill byte for the guard region past the expected write extent.
pub(crate) const GUARD_BYTE: u8 = 0xCD;

/// Mismatches logged per case before the rest are counted silently.
const MAX_LOGGED_MISMATCHES: usize = 16;

/// One capture-enabled draw call: where its vertices start in the input
/// buffer and how many it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DrawSegment {
    /// First input vertex index of this draw.
    pub in_base: usize,
    /// Input vertex count of this draw.
    pub count: usize,
}

fn scalar_bytes(data: &[u8], offset: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&data[offset..offset + 4]);
    out
}

/// Verifies every captured output buffer against the input data.
///
/// Capture-enabled draws append their vertices back to back, so the
/// expected record index is the running output-vertex total across
/// `segments`. Returns true when every component of every record matches.
#[allow(clippy::too_many_arguments)]
pub(crate) fn verify_captured_data(
    outputs: &[Output],
    layout: &InputLayout,
    input_data: &[u8],
    strides: &[usize],
    buffers: &[Vec<u8>],
    segments: &[DrawSegment],
    primitive: PrimitiveType,
) -> bool {
    let mut mismatches = 0usize;

    for output in outputs {
        let stride = strides[output.buffer];
        let buffer = &buffers[output.buffer];

        let mut out_base = 0usize;
        for (seg_index, segment) in segments.iter().enumerate() {
            let emitted = topology::output_count(primitive, segment.count);
            for local in 0..emitted {
                let in_vertex =
                    segment.in_base + topology::input_index_for_output(primitive, segment.count, local);
                let out_vertex = out_base + local;

                let mut out_offset = out_vertex * stride + output.offset;
                for attr in &output.inputs {
                    let ty = attr.data_type();
                    for component in 0..ty.scalar_count() {
                        let in_offset = in_vertex * layout.stride + attr.offset + component * 4;
                        let expected = scalar_bytes(input_data, in_offset);
                        let actual = scalar_bytes(buffer, out_offset);

                        let ok = if ty.is_float_or_matrix() {
                            let e = f32::from_ne_bytes(expected);
                            let a = f32::from_ne_bytes(actual);
                            (e - a).abs() < FLOAT_THRESHOLD
                        } else {
                            expected == actual
                        };

                        if !ok {
                            if mismatches < MAX_LOGGED_MISMATCHES {
                                warn!(
                                    output = %output.name,
                                    attribute = %attr.name,
                                    draw = seg_index,
                                    out_vertex,
                                    in_vertex,
                                    component,
                                    expected = ?expected,
                                    actual = ?actual,
                                    "captured component mismatch"
                                );
                            }
                            mismatches += 1;
                        }
                        out_offset += 4;
                    }
                }
            }
            out_base += emitted;
        }
    }

    if mismatches > MAX_LOGGED_MISMATCHES {
        warn!(
            mismatches,
            logged = MAX_LOGGED_MISMATCHES,
            "further mismatches suppressed"
        );
    }
    mismatches == 0
}

/// Checks that everything past the written extent of a buffer still holds
/// the guard fill.
pub(crate) fn verify_guard_region(buffer: &[u8], written_len: usize) -> bool {
    match buffer[written_len..].iter().position(|&b| b != GUARD_BYTE) {
        None => true,
        Some(at) => {
            warn!(
                offset = written_len + at,
                value = buffer[written_len + at],
                "guard region overwritten"
            );
            false
        }
    }
}
