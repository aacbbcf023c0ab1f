use rand::Rng;
use xfb_types::{DataType, Precision};

use crate::layout::{Attribute, InputLayout, POSITION_ATTRIBUTE_NAME};

/// Fills one attribute's column of the interleaved input buffer with
/// type- and precision-appropriate random values.
///
/// Value ranges per precision tier:
/// - float: lowp quantized to multiples of 0.25 in `[0, 1]`, mediump
///   uniform in `[-1000, 1000]`, highp uniform in `[-100000, 100000]`
/// - int: lowp `[-128, 127]`, mediump `[-32768, 32767]`, highp full range
/// - uint: lowp `[0, 255]`, mediump `[0, 65535]`, highp `unsigned_abs` of a
///   full-range signed draw (biased toward small magnitudes; kept for
///   parity with existing conformance baselines)
///
/// The position attribute is always filled with x/y/z in `[-1.2, 1.2]` and
/// w in `[0.1, 2.0]` regardless of declared precision, so every generated
/// vertex has a valid clip-space w.
pub fn fill_attribute_data(
    attribute: &Attribute,
    data: &mut [u8],
    stride: usize,
    vertex_count: usize,
    rng: &mut impl Rng,
) {
    let (ty, precision) = attribute
        .ty
        .as_basic()
        .expect("attributes are always basic types");
    let components = ty.scalar_count();

    for vertex in 0..vertex_count {
        let base = vertex * stride + attribute.offset;
        for component in 0..components {
            let offset = base + component * 4;
            let dst = &mut data[offset..offset + 4];

            if attribute.name == POSITION_ATTRIBUTE_NAME {
                let value: f32 = if component == 3 {
                    rng.gen_range(0.1..=2.0)
                } else {
                    rng.gen_range(-1.2..=1.2)
                };
                dst.copy_from_slice(bytemuck::bytes_of(&value));
            } else if ty.is_float_or_matrix() {
                let value: f32 = match precision {
                    Precision::Lowp => rng.gen_range(0u32..=4) as f32 * 0.25,
                    Precision::Mediump => rng.gen_range(-1000.0..=1000.0),
                    Precision::Highp => rng.gen_range(-100000.0..=100000.0),
                };
                dst.copy_from_slice(bytemuck::bytes_of(&value));
            } else if ty.is_int_kind() {
                let value: i32 = match precision {
                    Precision::Lowp => rng.gen_range(-128..=127),
                    Precision::Mediump => rng.gen_range(-32768..=32767),
                    Precision::Highp => rng.gen(),
                };
                dst.copy_from_slice(bytemuck::bytes_of(&value));
            } else if ty.is_uint_kind() {
                let value: u32 = match precision {
                    Precision::Lowp => rng.gen_range(0..=255),
                    Precision::Mediump => rng.gen_range(0..=65535),
                    Precision::Highp => rng.gen::<i32>().unsigned_abs(),
                };
                dst.copy_from_slice(bytemuck::bytes_of(&value));
            } else {
                // Bool attributes cannot be sourced from vertex arrays in
                // GLES3 and never occur in generated programs; emit 0/1 so
                // the buffer is still fully initialized if one slips in.
                let value: u32 = rng.gen_range(0..=1);
                dst.copy_from_slice(bytemuck::bytes_of(&value));
            }
        }
    }
}

/// Allocates and fills the whole interleaved input buffer for
/// `vertex_count` vertices.
pub fn fill_input_buffer(
    layout: &InputLayout,
    vertex_count: usize,
    rng: &mut impl Rng,
) -> Vec<u8> {
    let mut data = vec![0u8; layout.stride * vertex_count];
    for attribute in &layout.attributes {
        fill_attribute_data(attribute, &mut data, layout.stride, vertex_count, rng);
    }
    data
}
