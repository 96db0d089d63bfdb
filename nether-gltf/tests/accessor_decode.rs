//! Integration tests for the accessor decoder.
//!
//! Covers normalization, strides, matrix column padding and sparse overlays,
//! decoding through both the free function and a validated `Model`.

mod common;

use common::{DocumentBuilder, approx_eq};
use nether_gltf::accessor::MAX_DECODED_BYTES;
use nether_gltf::schema::{
    Accessor, ComponentType, ElementType, IndexType, Sparse, SparseIndices, SparseValues,
};
use nether_gltf::{GltfError, Model, Values, decode};

#[test]
fn test_normalized_ubyte() {
    let mut builder = DocumentBuilder::new();
    let accessor = builder.pack_u8(&[0, 128, 255], ElementType::Scalar, true);
    let (document, buffers) = builder.finish();

    let decoded = decode(&document, &buffers, accessor).unwrap();
    let values = decoded.as_f32().expect("normalized data decodes to floats");
    assert_eq!(values[0], 0.0);
    assert!((values[1] - 0.502).abs() < 1e-3, "got {}", values[1]);
    assert_eq!(values[2], 1.0);
}

#[test]
fn test_normalized_short_bounds() {
    let mut builder = DocumentBuilder::new();
    let accessor = builder.pack_i16(&[-32768, -32767, 0, 32767], ElementType::Vec4, true);
    let (document, buffers) = builder.finish();

    let decoded = decode(&document, &buffers, accessor).unwrap();
    assert_eq!(decoded.count, 1);
    // Both -32768 and -32767 map to -1
    assert_eq!(decoded.f32_tuple(0), Some(&[-1.0, -1.0, 0.0, 1.0][..]));
}

#[test]
fn test_integer_components_stay_integers() {
    let mut builder = DocumentBuilder::new();
    let indices = builder.pack_u16(&[0, 1, 2, 2, 1, 3], ElementType::Scalar);
    let signed = builder.pack_i16(&[-5, 7], ElementType::Vec2, false);
    let (document, buffers) = builder.finish();

    let decoded = decode(&document, &buffers, indices).unwrap();
    assert_eq!(decoded.as_unsigned(), Some(&[0, 1, 2, 2, 1, 3][..]));
    assert_eq!(decoded.values, Values::Unsigned(vec![0, 1, 2, 2, 1, 3]));

    let decoded = decode(&document, &buffers, signed).unwrap();
    assert_eq!(decoded.as_signed(), Some(&[-5, 7][..]));
}

#[test]
fn test_interleaved_stride() {
    // position.xyz, normal.xyz per vertex
    let vertices: [f32; 12] = [
        1.0, 2.0, 3.0, 0.0, 1.0, 0.0, //
        4.0, 5.0, 6.0, 0.0, 0.0, 1.0,
    ];
    let mut builder = DocumentBuilder::new();
    let view = builder.push_view(bytemuck::cast_slice(&vertices), Some(24));
    let positions = builder.push_accessor(
        Accessor::new(ComponentType::F32, ElementType::Vec3, 2).with_view(view, 0),
    );
    let normals = builder.push_accessor(
        Accessor::new(ComponentType::F32, ElementType::Vec3, 2).with_view(view, 12),
    );
    let (document, buffers) = builder.finish();

    let model = Model::new(document, buffers).unwrap();
    let decoded = model.decode_accessor(positions).unwrap();
    assert_eq!(decoded.to_f32_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let decoded = model.decode_accessor(normals).unwrap();
    assert_eq!(decoded.f32_tuple(1), Some(&[0.0, 0.0, 1.0][..]));
}

#[test]
fn test_mat2_ubyte_column_padding() {
    // Each 2-byte column is padded to 4 bytes
    let mut builder = DocumentBuilder::new();
    let view = builder.push_view(&[1, 2, 0xAA, 0xAA, 3, 4, 0xBB, 0xBB], None);
    let accessor = builder
        .push_accessor(Accessor::new(ComponentType::U8, ElementType::Mat2, 1).with_view(view, 0));
    let (document, buffers) = builder.finish();

    let decoded = decode(&document, &buffers, accessor).unwrap();
    assert_eq!(decoded.as_unsigned(), Some(&[1, 2, 3, 4][..]));
}

fn sparse_document(indices: &[u8]) -> (nether_gltf::Document, nether_gltf::Buffers, usize) {
    let mut builder = DocumentBuilder::new();
    let index_view = builder.push_view(indices, None);
    let values: Vec<f32> = (0..indices.len()).map(|i| 9.0 + i as f32).collect();
    let value_view = builder.push_view(bytemuck::cast_slice(&values), None);
    let accessor = builder.push_accessor(
        Accessor::new(ComponentType::F32, ElementType::Scalar, 4).with_sparse(Sparse::new(
            indices.len(),
            SparseIndices::new(index_view, IndexType::U8),
            SparseValues::new(value_view),
        )),
    );
    let (document, buffers) = builder.finish();
    (document, buffers, accessor)
}

#[test]
fn test_sparse_over_zero_base() {
    let (document, buffers, accessor) = sparse_document(&[2]);
    let model = Model::new(document, buffers).unwrap();
    let decoded = model.decode_accessor(accessor).unwrap();
    assert_eq!(decoded.to_f32_vec(), vec![0.0, 0.0, 9.0, 0.0]);
}

#[test]
fn test_sparse_over_base_view() {
    let mut builder = DocumentBuilder::new();
    let base = builder.pack_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], ElementType::Vec2);
    let index_view = builder.push_view(bytemuck::cast_slice(&[0u16, 2]), None);
    let value_view = builder.push_view(bytemuck::cast_slice(&[10.0f32, 11.0, 50.0, 60.0]), None);
    builder.document.accessors[base].sparse = Some(Sparse::new(
        2,
        SparseIndices::new(index_view, IndexType::U16),
        SparseValues::new(value_view),
    ));
    let (document, buffers) = builder.finish();
    let untouched = buffers.clone();

    let first = decode(&document, &buffers, base).unwrap();
    assert_eq!(first.to_f32_vec(), vec![10.0, 11.0, 3.0, 4.0, 50.0, 60.0]);

    // Decoding is pure: same result, resident bytes unchanged
    let second = decode(&document, &buffers, base).unwrap();
    assert_eq!(first, second);
    assert_eq!(buffers, untouched);
}

#[test]
fn test_sparse_unsorted_indices_fail_closed() {
    let (document, buffers, accessor) = sparse_document(&[2, 1]);
    let err = decode(&document, &buffers, accessor).unwrap_err();
    assert!(matches!(
        err,
        GltfError::NonMonotonicSparseIndex {
            position: 1,
            index: 1,
            previous: 2,
            ..
        }
    ));
    assert_eq!(err.path().as_str(), "accessors[0].sparse.indices");
}

#[test]
fn test_sparse_index_out_of_range() {
    let (document, buffers, accessor) = sparse_document(&[1, 4]);
    assert!(matches!(
        decode(&document, &buffers, accessor),
        Err(GltfError::SparseIndexOutOfRange {
            position: 1,
            index: 4,
            count: 4,
            ..
        })
    ));
    let report = Model::new(document, buffers).unwrap_err();
    assert!(
        report
            .iter()
            .any(|e| matches!(e, GltfError::SparseIndexOutOfRange { .. }))
    );
}

#[test]
fn test_accessor_past_view_end() {
    let mut builder = DocumentBuilder::new();
    let accessor = builder.pack_f32(&[0.0; 6], ElementType::Vec3);
    builder.document.accessors[accessor].count = 3;
    let (document, buffers) = builder.finish();

    assert!(matches!(
        decode(&document, &buffers, accessor),
        Err(GltfError::OutOfBounds { .. })
    ));
}

#[test]
fn test_float_normalization_rejected() {
    let mut builder = DocumentBuilder::new();
    let accessor = builder.pack_f32(&[0.5], ElementType::Scalar);
    builder.document.accessors[accessor].normalized = true;
    let (document, buffers) = builder.finish();

    let err = decode(&document, &buffers, accessor).unwrap_err();
    assert!(matches!(
        err,
        GltfError::InvalidNormalization {
            component_type: ComponentType::F32,
            ..
        }
    ));
}

#[test]
fn test_unknown_accessor_index() {
    let (document, buffers) = DocumentBuilder::new().finish();
    assert!(matches!(
        decode(&document, &buffers, 7),
        Err(GltfError::UnknownIndex {
            kind: "accessor",
            index: 7,
            ..
        })
    ));
}

#[test]
fn test_decode_all_matches_individual_decodes() {
    let mut builder = DocumentBuilder::new();
    builder.pack_f32(&[1.0, 2.0, 3.0], ElementType::Vec3);
    builder.pack_u8(&[0, 255], ElementType::Vec2, true);
    builder.pack_u16(&[7, 8, 9], ElementType::Scalar);
    let (document, buffers) = builder.finish();

    let model = Model::new(document, buffers).unwrap();
    let all = model.decode_all();
    assert_eq!(all.len(), 3);
    for (index, result) in all.into_iter().enumerate() {
        assert_eq!(result.unwrap(), model.decode_accessor(index).unwrap());
    }
    assert!(approx_eq(
        &model.decode_accessor(1).unwrap().to_f32_vec(),
        &[0.0, 1.0],
        0.0
    ));
}

#[test]
fn test_zero_filled_decode_limit() {
    let mut builder = DocumentBuilder::new();
    let huge = builder.push_accessor(Accessor::new(ComponentType::F32, ElementType::Scalar, 1 << 30));
    let overflow = builder.push_accessor(Accessor::new(ComponentType::F32, ElementType::Vec4, usize::MAX));
    let (document, buffers) = builder.finish();

    let err = decode(&document, &buffers, huge).unwrap_err();
    assert!(matches!(
        err,
        GltfError::DecodeLimit {
            limit: MAX_DECODED_BYTES,
            ..
        }
    ));
    assert_eq!(err.path().as_str(), "accessors[0].count");
    assert!(matches!(
        decode(&document, &buffers, overflow),
        Err(GltfError::DecodeLimit { .. })
    ));
}

#[test]
fn test_zero_stride_decode_limit() {
    // Rejected by validation; decoding an unchecked document must still fail closed
    let mut builder = DocumentBuilder::new();
    let view = builder.push_view(&[0; 4], Some(0));
    let accessor = builder.push_accessor(
        Accessor::new(ComponentType::F32, ElementType::Scalar, usize::MAX / 2).with_view(view, 0),
    );
    let (document, buffers) = builder.finish();

    assert!(matches!(
        decode(&document, &buffers, accessor),
        Err(GltfError::DecodeLimit { .. })
    ));
}

#[test]
fn test_normalized_unsigned_round_trip() {
    let originals: Vec<f32> = (0..=100).map(|i| i as f32 / 100.0).collect();
    let encoded: Vec<u8> = originals.iter().map(|f| (f * 255.0).round() as u8).collect();
    let mut builder = DocumentBuilder::new();
    let accessor = builder.pack_u8(&encoded, ElementType::Scalar, true);
    let (document, buffers) = builder.finish();

    let decoded = decode(&document, &buffers, accessor).unwrap().to_f32_vec();
    assert!(approx_eq(&decoded, &originals, 1.0 / 255.0));
}

#[test]
fn test_normalized_signed_round_trip() {
    let originals: Vec<f32> = (-100..=100).map(|i| i as f32 / 100.0).collect();
    let bytes: Vec<u8> = originals
        .iter()
        .map(|f| (f * 127.0).round() as i8 as u8)
        .collect();
    let shorts: Vec<i16> = originals
        .iter()
        .map(|f| (f * 32767.0).round() as i16)
        .collect();

    let mut builder = DocumentBuilder::new();
    let view = builder.push_view(&bytes, None);
    let signed_bytes = builder.push_accessor(
        Accessor::new(ComponentType::I8, ElementType::Scalar, bytes.len())
            .with_view(view, 0)
            .with_normalized(true),
    );
    let signed_shorts = builder.pack_i16(&shorts, ElementType::Scalar, true);
    let (document, buffers) = builder.finish();

    let decoded = decode(&document, &buffers, signed_bytes).unwrap().to_f32_vec();
    assert!(approx_eq(&decoded, &originals, 1.0 / 127.0));
    let decoded = decode(&document, &buffers, signed_shorts).unwrap().to_f32_vec();
    assert!(approx_eq(&decoded, &originals, 1.0 / 32767.0));
}

#[test]
fn test_decode_is_repeatable() {
    let vertices: [f32; 8] = [1.0, 2.0, 0.0, 0.0, 3.0, 4.0, 0.0, 0.0];
    let mut builder = DocumentBuilder::new();
    let view = builder.push_view(bytemuck::cast_slice(&vertices), Some(16));
    let strided = builder.push_accessor(
        Accessor::new(ComponentType::F32, ElementType::Vec2, 2).with_view(view, 0),
    );
    let normalized = builder.pack_u8(&[0, 51, 255, 17], ElementType::Vec4, true);
    let (document, buffers) = builder.finish();
    let document_before = document.clone();
    let buffers_before = buffers.clone();

    for accessor in [strided, normalized] {
        let first = decode(&document, &buffers, accessor).unwrap();
        let second = decode(&document, &buffers, accessor).unwrap();
        assert_eq!(first, second);
    }
    assert_eq!(
        decode(&document, &buffers, strided).unwrap().to_f32_vec(),
        vec![1.0, 2.0, 3.0, 4.0]
    );
    assert_eq!(document, document_before);
    assert_eq!(buffers, buffers_before);
}
