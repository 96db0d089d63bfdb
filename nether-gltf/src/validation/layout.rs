//! Phases 2-5: byte ranges, alignment/stride, normalization, sparse indices

use hashbrown::HashMap;

use crate::accessor::{ElementLayout, index_violations, read_indices};
use crate::error::{GltfError, Path};
use crate::schema::{MAX_BYTE_STRIDE, MIN_BYTE_STRIDE};

use super::Validator;

impl Validator<'_> {
    pub(super) fn check_ranges(&mut self) {
        let doc = self.document;
        let buffers = self.buffers;

        for (i, buffer) in doc.buffers.iter().enumerate() {
            if let Some(bytes) = buffers.get(i) {
                if bytes.len() != buffer.byte_length {
                    self.report(GltfError::BufferLengthMismatch {
                        path: Path::item("buffers", i).field("byteLength"),
                        declared: buffer.byte_length,
                        actual: bytes.len(),
                    });
                }
            }
        }

        for (i, view) in doc.buffer_views.iter().enumerate() {
            let Some(buffer) = doc.buffers.get(view.buffer) else {
                continue;
            };
            let end = view.byte_offset.checked_add(view.byte_length);
            if end.is_none_or(|end| end > buffer.byte_length) {
                self.report(GltfError::OutOfBounds {
                    path: Path::item("bufferViews", i),
                    offset: view.byte_offset,
                    end: end.unwrap_or(usize::MAX),
                    length: buffer.byte_length,
                });
            }
        }

        for (i, accessor) in doc.accessors.iter().enumerate() {
            if self.is_broken(i) {
                continue;
            }
            let path = Path::item("accessors", i);
            let layout = ElementLayout::of(accessor);

            if let Some(view) = accessor.buffer_view.and_then(|v| doc.buffer_views.get(v)) {
                let stride = view.byte_stride.unwrap_or_else(|| layout.stored_size());
                let end = layout
                    .extent(accessor.count, stride)
                    .and_then(|extent| extent.checked_add(accessor.byte_offset));
                if end.is_none_or(|end| end > view.byte_length) {
                    self.report_accessor(
                        i,
                        GltfError::OutOfBounds {
                            path: path.clone(),
                            offset: accessor.byte_offset,
                            end: end.unwrap_or(usize::MAX),
                            length: view.byte_length,
                        },
                    );
                }
            }

            let Some(sparse) = &accessor.sparse else {
                continue;
            };
            let sparse_path = path.field("sparse");
            if let Some(view) = doc.buffer_views.get(sparse.indices.buffer_view) {
                let end = sparse
                    .count
                    .checked_mul(sparse.indices.component_type.size())
                    .and_then(|len| len.checked_add(sparse.indices.byte_offset));
                if end.is_none_or(|end| end > view.byte_length) {
                    self.report_accessor(
                        i,
                        GltfError::OutOfBounds {
                            path: sparse_path.field("indices"),
                            offset: sparse.indices.byte_offset,
                            end: end.unwrap_or(usize::MAX),
                            length: view.byte_length,
                        },
                    );
                }
            }
            if let Some(view) = doc.buffer_views.get(sparse.values.buffer_view) {
                let end = layout
                    .extent(sparse.count, layout.stored_size())
                    .and_then(|extent| extent.checked_add(sparse.values.byte_offset));
                if end.is_none_or(|end| end > view.byte_length) {
                    self.report_accessor(
                        i,
                        GltfError::OutOfBounds {
                            path: sparse_path.field("values"),
                            offset: sparse.values.byte_offset,
                            end: end.unwrap_or(usize::MAX),
                            length: view.byte_length,
                        },
                    );
                }
            }
        }
    }

    pub(super) fn check_alignment(&mut self) {
        let doc = self.document;

        for (i, view) in doc.buffer_views.iter().enumerate() {
            if let Some(stride) = view.byte_stride {
                if !(MIN_BYTE_STRIDE..=MAX_BYTE_STRIDE).contains(&stride) || stride % 4 != 0 {
                    self.report(GltfError::InvalidStride {
                        path: Path::item("bufferViews", i).field("byteStride"),
                        stride: Some(stride),
                        element_size: 0,
                    });
                }
            }
        }

        // view -> (accessor count, largest element)
        let mut users: HashMap<usize, (usize, usize)> = HashMap::new();

        for (i, accessor) in doc.accessors.iter().enumerate() {
            let path = Path::item("accessors", i);
            let layout = ElementLayout::of(accessor);
            let alignment = accessor.component_type.size();

            if accessor.count == 0 {
                self.report_accessor(i, GltfError::InvalidCount { path: path.field("count") });
            }

            if let Some(view_index) = accessor.buffer_view {
                if accessor.byte_offset % alignment != 0 {
                    self.report_accessor(
                        i,
                        GltfError::MisalignedOffset {
                            path: path.field("byteOffset"),
                            offset: accessor.byte_offset,
                            alignment,
                        },
                    );
                } else if let Some(view) = doc.buffer_views.get(view_index) {
                    let combined = view.byte_offset.saturating_add(accessor.byte_offset);
                    if combined % alignment != 0 {
                        self.report_accessor(
                            i,
                            GltfError::MisalignedOffset {
                                path: Path::item("bufferViews", view_index).field("byteOffset"),
                                offset: combined,
                                alignment,
                            },
                        );
                    }
                }

                if let Some(view) = doc.buffer_views.get(view_index) {
                    if let Some(stride) = view.byte_stride {
                        if stride < layout.stored_size() {
                            self.report_accessor(
                                i,
                                GltfError::InvalidStride {
                                    path: path.field("bufferView"),
                                    stride: Some(stride),
                                    element_size: layout.stored_size(),
                                },
                            );
                        }
                    }
                    let entry = users.entry(view_index).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 = entry.1.max(layout.stored_size());
                }
            }

            let Some(sparse) = &accessor.sparse else {
                continue;
            };
            let sparse_path = path.field("sparse");
            if sparse.count == 0 {
                self.report_accessor(
                    i,
                    GltfError::InvalidCount {
                        path: sparse_path.field("count"),
                    },
                );
            }
            let index_size = sparse.indices.component_type.size();
            for (field, view_index, offset, alignment) in [
                (
                    "indices",
                    sparse.indices.buffer_view,
                    sparse.indices.byte_offset,
                    index_size,
                ),
                (
                    "values",
                    sparse.values.buffer_view,
                    sparse.values.byte_offset,
                    alignment,
                ),
            ] {
                if offset % alignment != 0 {
                    self.report_accessor(
                        i,
                        GltfError::MisalignedOffset {
                            path: sparse_path.field(field).field("byteOffset"),
                            offset,
                            alignment,
                        },
                    );
                } else if let Some(view) = doc.buffer_views.get(view_index) {
                    let combined = view.byte_offset.saturating_add(offset);
                    if combined % alignment != 0 {
                        self.report_accessor(
                            i,
                            GltfError::MisalignedOffset {
                                path: Path::item("bufferViews", view_index).field("byteOffset"),
                                offset: combined,
                                alignment,
                            },
                        );
                    }
                }
            }
            for (field, view_index) in [
                ("indices", sparse.indices.buffer_view),
                ("values", sparse.values.buffer_view),
            ] {
                if let Some(view) = doc.buffer_views.get(view_index) {
                    if view.target.is_some() || view.byte_stride.is_some() {
                        self.report_accessor(
                            i,
                            GltfError::InvalidSparseView {
                                path: sparse_path.field(field).field("bufferView"),
                            },
                        );
                    }
                }
            }
        }

        let mut shared: Vec<_> = users
            .into_iter()
            .filter(|&(view, (count, _))| {
                count > 1 && doc.buffer_views[view].byte_stride.is_none()
            })
            .collect();
        shared.sort_unstable_by_key(|&(view, _)| view);
        for (view, (_, element_size)) in shared {
            self.report(GltfError::InvalidStride {
                path: Path::item("bufferViews", view).field("byteStride"),
                stride: None,
                element_size,
            });
        }
    }

    pub(super) fn check_normalization(&mut self) {
        let doc = self.document;
        for (i, accessor) in doc.accessors.iter().enumerate() {
            if accessor.normalized && !accessor.component_type.is_normalizable() {
                self.report_accessor(
                    i,
                    GltfError::InvalidNormalization {
                        path: Path::item("accessors", i).field("normalized"),
                        component_type: accessor.component_type,
                    },
                );
            }
        }
    }

    pub(super) fn check_sparse_indices(&mut self) {
        let doc = self.document;
        for (i, accessor) in doc.accessors.iter().enumerate() {
            let Some(sparse) = &accessor.sparse else {
                continue;
            };
            if self.is_broken(i) {
                continue;
            }
            let path = Path::item("accessors", i).field("sparse");
            let violations = match read_indices(doc, self.buffers, sparse, &path) {
                Ok(indices) => index_violations(&indices, accessor.count, &path),
                Err(err) => vec![err],
            };
            for violation in violations {
                self.report_accessor(i, violation);
            }
        }
    }
}
