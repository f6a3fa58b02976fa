#![allow(dead_code)]

use dicom::core::{DataElement, PrimitiveValue, VR, value::C};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom_dictionary_std::{tags, uids};
use ndarray::{Array, IxDyn};
use slice_viewer::Volume;
use std::path::Path;

pub const ROWS: u16 = 4;
pub const COLUMNS: u16 = 6;

/// Sample value stored at `(row, column)` of the given instance.
pub fn expected_sample(instance: u16, row: usize, column: usize) -> f32 {
    (instance as usize * 100 + row * COLUMNS as usize + column) as f32
}

fn frame(instance: u16) -> Vec<u16> {
    (0..ROWS as usize)
        .flat_map(|row| {
            (0..COLUMNS as usize).map(move |column| expected_sample(instance, row, column) as u16)
        })
        .collect()
}

fn put_us(obj: &mut InMemDicomObject, tag: dicom::core::Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

/// Write a 16-bit MONOCHROME2 secondary capture with one frame per entry in
/// `instances`. More than one entry produces a multi-frame object.
pub fn write_dicom(path: &Path, instance_number: Option<i32>, instances: &[u16]) {
    let sop_instance_uid = format!(
        "1.2.826.0.1.3680043.10.1234.{}",
        instance_number.unwrap_or(0) + 1000 * instances.len() as i32
    );

    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(sop_instance_uid.as_str()),
    ));
    if let Some(number) = instance_number {
        obj.put(DataElement::new(
            tags::INSTANCE_NUMBER,
            VR::IS,
            PrimitiveValue::from(number.to_string()),
        ));
    }
    if instances.len() > 1 {
        obj.put(DataElement::new(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from(instances.len().to_string()),
        ));
    }
    put_us(&mut obj, tags::SAMPLES_PER_PIXEL, 1);
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    put_us(&mut obj, tags::ROWS, ROWS);
    put_us(&mut obj, tags::COLUMNS, COLUMNS);
    put_us(&mut obj, tags::BITS_ALLOCATED, 16);
    put_us(&mut obj, tags::BITS_STORED, 16);
    put_us(&mut obj, tags::HIGH_BIT, 15);
    put_us(&mut obj, tags::PIXEL_REPRESENTATION, 0);

    let pixels: Vec<u16> = instances.iter().flat_map(|&instance| frame(instance)).collect();
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(C::from_vec(pixels)),
    ));

    let meta = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
        .media_storage_sop_instance_uid(&sop_instance_uid)
        .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
        .build()
        .expect("should have built file meta group");
    obj.with_exact_meta(meta)
        .write_to_file(path)
        .expect("should have written DICOM file");
}

/// Volume of the given shape filled with `index % 251`.
pub fn ramp_volume(shape: &[usize]) -> Volume {
    let len = shape.iter().product::<usize>();
    let data = Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| (v % 251) as f32).collect())
        .expect("shape should match the sample count");
    Volume::new(data).expect("rank should be supported")
}
