//! Decoding native array structures into owned collections.
//!
//! The native metadata read fills several array-shaped structures at once;
//! historically each managed binding walked them with hand-computed byte
//! offsets, repeated per pixel type. Here every walk is the same operation:
//! view the (pointer, count) pair as a typed slice through
//! [`crate::ffi::view::native_slice`] and copy each element into its owned
//! counterpart. The functions stay `unsafe` because they trust pointers the
//! native layer produced; callers hold the corresponding free guard while
//! decoding.

use crate::error::Result;
use crate::ffi::types::{
    CColorInfo, CColorInfoVector, CDataTypeVector, CHistogram, CParameters, CSize5DVector,
    CThumbnail, CTimeInfoVector,
};
use crate::ffi::view::{c_str_lossy, native_slice};
use crate::types::{
    ChannelColor, Color, ColorMode, DataType, Histogram, Parameters, Size5D, Thumbnail, TimeInfo,
};

/// Decode the data type codes of a discovery result.
///
/// Fails on a code outside the ABI enum; the caller still owns freeing the
/// native array in that case.
///
/// # Safety
///
/// `raw` must be a vector filled by the native layer and not yet freed.
pub unsafe fn data_types(raw: &CDataTypeVector) -> Result<Vec<DataType>> {
    native_slice(raw.data_types, raw.data_types_size)
        .iter()
        .map(|&code| DataType::try_from(code))
        .collect()
}

/// Decode a per-resolution size array into an ordered sequence.
///
/// # Safety
///
/// `raw` must be a vector filled by the native layer and not yet freed.
pub unsafe fn size_per_resolution(raw: &CSize5DVector) -> Vec<Size5D> {
    native_slice(raw.size_per_resolution, raw.size_per_resolution_size)
        .iter()
        .map(Size5D::from_c)
        .collect()
}

/// Decode the per-timepoint acquisition timestamps.
///
/// # Safety
///
/// `raw` must be a vector filled by the native layer and not yet freed.
pub unsafe fn time_infos(raw: &CTimeInfoVector) -> Vec<TimeInfo> {
    native_slice(raw.values, raw.values_size)
        .iter()
        .map(TimeInfo::from_c)
        .collect()
}

/// Decode the per-channel color descriptors.
///
/// Representation is decided by the color-table length: zero means base color
/// mode, nonzero means an explicit table of that many entries.
///
/// # Safety
///
/// `raw` must be a vector filled by the native layer and not yet freed.
pub unsafe fn channel_colors(raw: &CColorInfoVector) -> Vec<ChannelColor> {
    native_slice(raw.values, raw.values_size)
        .iter()
        .map(|info| channel_color(info))
        .collect()
}

unsafe fn channel_color(raw: &CColorInfo) -> ChannelColor {
    let mode = if raw.color_table_size == 0 {
        ColorMode::BaseColor(Color::from_c(&raw.base_color))
    } else {
        let table = native_slice(raw.color_table, raw.color_table_size)
            .iter()
            .map(Color::from_c)
            .collect();
        ColorMode::Table(table)
    };
    ChannelColor {
        mode,
        opacity: raw.opacity,
        range_min: raw.range_min,
        range_max: raw.range_max,
        gamma_correction: raw.gamma_correction,
    }
}

/// Decode the two-level parameter mapping.
///
/// Duplicate section or key names are last-write-wins, matching the map
/// insert order of the walk.
///
/// # Safety
///
/// `raw` must be a structure filled by the native layer and not yet freed.
pub unsafe fn parameters(raw: &CParameters) -> Parameters {
    let mut decoded = Parameters::new();
    for section in native_slice(raw.values, raw.values_count) {
        let section_name = c_str_lossy(section.name);
        for parameter in native_slice(section.values, section.values_count) {
            decoded.set_value(
                section_name.clone(),
                c_str_lossy(parameter.name),
                c_str_lossy(parameter.value),
            );
        }
    }
    decoded
}

/// Copy a native histogram into an owned one.
///
/// # Safety
///
/// `raw` must be a histogram returned by the native layer.
pub unsafe fn histogram(raw: &CHistogram) -> Histogram {
    Histogram {
        min: raw.min,
        max: raw.max,
        bins: native_slice(raw.bins, raw.bins_size).to_vec(),
    }
}

/// Copy a native thumbnail into an owned one.
///
/// # Safety
///
/// `raw` must be a thumbnail returned by the native layer.
pub unsafe fn thumbnail(raw: &CThumbnail) -> Thumbnail {
    Thumbnail {
        width: raw.size_x,
        height: raw.size_y,
        rgba: native_slice(raw.interleaved_rgba, raw.interleaved_rgba_size).to_vec(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use crate::ffi::types::{
        CColor, CDataType, CIndex5D, CParameter, CParameterSection, CTimeInfo,
    };
    use std::os::raw::c_char;
    use std::ptr;

    // The native layer fills (pointer, count) pairs over arrays it allocated;
    // these tests reproduce that shape over Rust-owned buffers.

    fn color(red: f32, green: f32, blue: f32, alpha: f32) -> CColor {
        CColor {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[test]
    fn test_data_types_decoded_in_order() {
        let mut codes: Vec<CDataType> = vec![0, 3, 1];
        let raw = CDataTypeVector {
            data_types: codes.as_mut_ptr(),
            data_types_size: codes.len() as u32,
        };

        let decoded = unsafe { data_types(&raw) }.unwrap();
        assert_eq!(
            decoded,
            vec![DataType::UInt8, DataType::Float32, DataType::UInt16]
        );
    }

    #[test]
    fn test_data_types_unknown_code_fails() {
        let mut codes: Vec<CDataType> = vec![0, 17];
        let raw = CDataTypeVector {
            data_types: codes.as_mut_ptr(),
            data_types_size: codes.len() as u32,
        };

        assert!(matches!(
            unsafe { data_types(&raw) },
            Err(ReaderError::UnknownDataType(17))
        ));
    }

    #[test]
    fn test_size_per_resolution_counts_and_fields_match() {
        let mut sizes = vec![
            CIndex5D {
                x: 2048,
                y: 2048,
                z: 64,
                c: 3,
                t: 10,
            },
            CIndex5D {
                x: 1024,
                y: 1024,
                z: 32,
                c: 3,
                t: 10,
            },
        ];
        let raw = CSize5DVector {
            size_per_resolution: sizes.as_mut_ptr(),
            size_per_resolution_size: sizes.len() as u32,
        };

        let decoded = unsafe { size_per_resolution(&raw) };
        assert_eq!(decoded.len(), sizes.len());
        for (owned, native) in decoded.iter().zip(&sizes) {
            assert_eq!(owned.x, native.x);
            assert_eq!(owned.y, native.y);
            assert_eq!(owned.z, native.z);
            assert_eq!(owned.c, native.c);
            assert_eq!(owned.t, native.t);
        }
    }

    #[test]
    fn test_empty_size_vector_decodes_empty() {
        let raw = CSize5DVector::default();
        assert!(unsafe { size_per_resolution(&raw) }.is_empty());
    }

    #[test]
    fn test_time_infos_preserve_julian_day_and_nanoseconds() {
        let mut values = vec![
            CTimeInfo {
                julian_day: 2460000,
                nanoseconds_of_day: 43_200_000_000_000,
            },
            CTimeInfo {
                julian_day: 2460001,
                nanoseconds_of_day: 1,
            },
        ];
        let raw = CTimeInfoVector {
            values: values.as_mut_ptr(),
            values_size: values.len() as u32,
        };

        let decoded = unsafe { time_infos(&raw) };
        assert_eq!(
            decoded,
            vec![
                TimeInfo {
                    julian_day: 2460000,
                    nanoseconds_of_day: 43_200_000_000_000,
                },
                TimeInfo {
                    julian_day: 2460001,
                    nanoseconds_of_day: 1,
                },
            ]
        );
    }

    #[test]
    fn test_channel_color_base_mode_on_zero_table_length() {
        let mut infos = vec![CColorInfo {
            // the bool says table mode, but a zero table length wins
            is_base_color_mode: false,
            base_color: color(1.0, 0.5, 0.0, 1.0),
            color_table: ptr::null_mut(),
            color_table_size: 0,
            opacity: 0.8,
            range_min: 10.0,
            range_max: 240.0,
            gamma_correction: 1.2,
        }];
        let raw = CColorInfoVector {
            values: infos.as_mut_ptr(),
            values_size: 1,
        };

        let decoded = unsafe { channel_colors(&raw) };
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            decoded[0].mode,
            ColorMode::BaseColor(Color {
                red: 1.0,
                green: 0.5,
                blue: 0.0,
                alpha: 1.0,
            })
        );
        assert_eq!(decoded[0].opacity, 0.8);
        assert_eq!(decoded[0].range_min, 10.0);
        assert_eq!(decoded[0].range_max, 240.0);
        assert_eq!(decoded[0].gamma_correction, 1.2);
    }

    #[test]
    fn test_channel_color_table_mode_copies_all_entries() {
        let mut table = vec![
            color(0.0, 0.0, 0.0, 1.0),
            color(0.5, 0.5, 0.5, 1.0),
            color(1.0, 1.0, 1.0, 1.0),
        ];
        let mut infos = vec![CColorInfo {
            is_base_color_mode: true,
            base_color: color(0.0, 1.0, 0.0, 1.0),
            color_table: table.as_mut_ptr(),
            color_table_size: table.len() as u32,
            opacity: 1.0,
            range_min: 0.0,
            range_max: 255.0,
            gamma_correction: 1.0,
        }];
        let raw = CColorInfoVector {
            values: infos.as_mut_ptr(),
            values_size: 1,
        };

        let decoded = unsafe { channel_colors(&raw) };
        match &decoded[0].mode {
            ColorMode::Table(entries) => {
                assert_eq!(entries.len(), 3);
                assert_eq!(entries[1].red, 0.5);
                assert_eq!(entries[2].blue, 1.0);
            }
            other => panic!("expected table mode, got {other:?}"),
        }
    }

    #[test]
    fn test_parameters_walk_decodes_all_sections_and_pairs() {
        let mut image_pairs = vec![
            CParameter {
                name: b"X\0".as_ptr() as *const c_char,
                value: b"512\0".as_ptr() as *const c_char,
            },
            CParameter {
                name: b"Y\0".as_ptr() as *const c_char,
                value: b"512\0".as_ptr() as *const c_char,
            },
        ];
        let mut channel_pairs = vec![CParameter {
            name: b"Name\0".as_ptr() as *const c_char,
            value: b"GFP\0".as_ptr() as *const c_char,
        }];
        let mut sections = vec![
            CParameterSection {
                name: b"Image\0".as_ptr() as *const c_char,
                values: image_pairs.as_mut_ptr(),
                values_count: image_pairs.len() as u32,
            },
            CParameterSection {
                name: b"Channel 0\0".as_ptr() as *const c_char,
                values: channel_pairs.as_mut_ptr(),
                values_count: channel_pairs.len() as u32,
            },
        ];
        let raw = CParameters {
            values: sections.as_mut_ptr(),
            values_count: sections.len() as u32,
        };

        let decoded = unsafe { parameters(&raw) };
        assert_eq!(decoded.section_count(), 2);
        assert_eq!(decoded.value("Image", "X"), Some("512"));
        assert_eq!(decoded.value("Image", "Y"), Some("512"));
        assert_eq!(decoded.value("Channel 0", "Name"), Some("GFP"));
    }

    #[test]
    fn test_parameters_duplicate_key_keeps_last_value() {
        let mut pairs = vec![
            CParameter {
                name: b"Unit\0".as_ptr() as *const c_char,
                value: b"um\0".as_ptr() as *const c_char,
            },
            CParameter {
                name: b"Unit\0".as_ptr() as *const c_char,
                value: b"nm\0".as_ptr() as *const c_char,
            },
        ];
        let mut sections = vec![CParameterSection {
            name: b"Image\0".as_ptr() as *const c_char,
            values: pairs.as_mut_ptr(),
            values_count: pairs.len() as u32,
        }];
        let raw = CParameters {
            values: sections.as_mut_ptr(),
            values_count: 1,
        };

        let decoded = unsafe { parameters(&raw) };
        assert_eq!(decoded.value("Image", "Unit"), Some("nm"));
    }

    #[test]
    fn test_histogram_integer_identity() {
        let mut bins = vec![0u64, 12, u64::MAX, 7];
        let raw = CHistogram {
            min: 3,
            max: 4095,
            bins: bins.as_mut_ptr(),
            bins_size: bins.len() as u32,
        };

        let decoded = unsafe { histogram(&raw) };
        assert_eq!(decoded.min, 3);
        assert_eq!(decoded.max, 4095);
        assert_eq!(decoded.bins, vec![0, 12, u64::MAX, 7]);
    }

    #[test]
    fn test_thumbnail_bytes_copied_verbatim() {
        let mut rgba: Vec<u8> = (0..32).collect();
        let raw = CThumbnail {
            size_x: 4,
            size_y: 2,
            interleaved_rgba: rgba.as_mut_ptr(),
            interleaved_rgba_size: rgba.len() as u32,
        };

        let decoded = unsafe { thumbnail(&raw) };
        assert_eq!(decoded.width, 4);
        assert_eq!(decoded.height, 2);
        assert_eq!(decoded.rgba, rgba);
    }
}
