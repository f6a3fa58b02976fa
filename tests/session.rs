use ndarray::{Array, IxDyn};
use pretty_assertions::assert_eq;
use slice_viewer::{
    OutputFormat, Rotation, Session, SessionError, TransformError, ViewState, ViewerConfig,
    Volume, export, transform,
};

mod util;

use util::ramp_volume;

fn session(shape: &[usize]) -> Session {
    Session::from_volume(ramp_volume(shape), ViewerConfig::default())
        .expect("should have rendered the middle slice")
}

#[test]
fn loading_exposes_slice_range_and_middle_slice() {
    let session = session(&[256, 256, 40]);
    assert_eq!(session.slice_count(), 40);
    assert_eq!(session.slice_index(), 20);
    assert_eq!(session.display().dimensions(), (256, 256));
    assert_eq!(session.view_state(), &ViewState::default());
}

#[test]
fn changing_slice_resets_view_state() {
    let mut session = session(&[32, 24, 5]);
    session.set_contrast(2.5).unwrap();
    session.set_zoom(1.8).unwrap();
    session.rotate_step().unwrap();
    session.flip_toggle().unwrap();

    session.change_slice(4).unwrap();

    assert_eq!(session.slice_index(), 4);
    assert_eq!(session.view_state(), &ViewState::default());
    let fresh = transform::normalize(session.canonical_slice()).unwrap();
    assert_eq!(session.display(), &fresh);
    assert_eq!(session.working_buffer().image(), &fresh);
}

#[test]
fn contrast_edits_do_not_compound() {
    let mut session = session(&[16, 16, 3]);
    session.set_contrast(2.0).unwrap();
    let once = session.display().clone();
    session.set_contrast(2.0).unwrap();
    assert_eq!(session.display(), &once);

    session.set_contrast(1.0).unwrap();
    let fresh = transform::normalize(session.canonical_slice()).unwrap();
    assert_eq!(session.display(), &fresh);
}

#[test]
fn contrast_is_clamped() {
    let mut session = session(&[8, 8, 2]);
    session.set_contrast(10.0).unwrap();
    assert_eq!(session.view_state().contrast, 3.0);
    session.set_contrast(0.0).unwrap();
    assert_eq!(session.view_state().contrast, 0.01);
}

#[test]
fn rotations_accumulate() {
    let mut session = session(&[10, 6, 3]);
    let original = session.display().clone();

    session.rotate_step().unwrap();
    assert_eq!(session.display().dimensions(), (10, 6));
    session.rotate_step().unwrap();
    assert_eq!(session.view_state().rotation, Rotation::Deg180);
    assert_eq!(
        session.display(),
        &transform::rotate(&original, Rotation::Deg180)
    );

    session.rotate_step().unwrap();
    session.rotate_step().unwrap();
    assert_eq!(session.view_state().rotation, Rotation::Deg0);
    assert_eq!(session.display(), &original);
}

#[test]
fn double_flip_restores_display() {
    let mut session = session(&[9, 7, 3]);
    let original = session.display().clone();
    session.flip_toggle().unwrap();
    assert_ne!(session.display(), &original);
    session.flip_toggle().unwrap();
    assert_eq!(session.display(), &original);
}

#[test]
fn contrast_keeps_orientation() {
    let mut session = session(&[12, 5, 3]);
    session.rotate_step().unwrap();
    session.flip_toggle().unwrap();
    session.set_zoom(1.5).unwrap();
    session.set_contrast(0.5).unwrap();

    let view = session.view_state();
    assert!(view.flipped);
    assert_eq!(view.rotation, Rotation::Deg90);
    assert_eq!(view.zoom, 1.5);
    assert_eq!(session.display().dimensions(), (12, 5));
    let expected = transform::render(session.canonical_slice(), view).unwrap();
    assert_eq!(session.display(), &expected);
}

#[test]
fn successive_zooms_compound() {
    let mut session = session(&[40, 40, 3]);
    let original = session.display().clone();
    session.set_zoom(2.0).unwrap();
    session.set_zoom(2.0).unwrap();

    let twice = transform::zoom(&transform::zoom(&original, 2.0).unwrap(), 2.0).unwrap();
    assert_eq!(session.display(), &twice);
    assert_eq!(session.view_state().zoom, 2.0);
}

#[test]
fn rotate_and_flip_act_on_zoomed_display() {
    let mut session = session(&[41, 40, 3]);
    session.set_zoom(1.7).unwrap();
    let zoomed = session.display().clone();

    session.rotate_step().unwrap();
    let rotated = transform::rotate(&zoomed, Rotation::Deg90);
    assert_eq!(session.display(), &rotated);

    session.flip_toggle().unwrap();
    assert_eq!(session.display(), &transform::flip(&rotated));
}

#[test]
fn zoom_at_unity_keeps_display() {
    let mut session = session(&[20, 20, 3]);
    let original = session.display().clone();
    session.set_zoom(1.0).unwrap();
    assert_eq!(session.display(), &original);

    session.set_zoom(2.0).unwrap();
    let zoomed = session.display().clone();
    assert_ne!(&zoomed, &original);
    session.set_zoom(1.0).unwrap();
    assert_eq!(session.display(), &zoomed);
    assert_eq!(session.view_state().zoom, 1.0);
}

#[test]
fn out_of_range_slice_leaves_state_unchanged() {
    let mut session = session(&[8, 8, 4]);
    session.set_contrast(1.5).unwrap();
    let display = session.display().clone();
    let view = *session.view_state();

    let err = session.change_slice(4).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidInput(TransformError::SliceIndexOutOfRange { index: 4, count: 4 })
    ));
    assert_eq!(session.slice_index(), 2);
    assert_eq!(session.view_state(), &view);
    assert_eq!(session.display(), &display);
}

#[test]
fn constant_slice_is_rejected_without_side_effects() {
    // slice 0 holds zeros only, the others a ramp
    let data = Array::from_shape_fn(IxDyn(&[6, 6, 3]), |index| {
        if index[2] == 0 {
            0.0
        } else {
            (index[0] * 6 + index[1]) as f32
        }
    });
    let volume = Volume::new(data).unwrap();
    let mut session = Session::from_volume(volume, ViewerConfig::default()).unwrap();
    let display = session.display().clone();

    let err = session.change_slice(0).unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidInput(TransformError::DegenerateRange { .. })
    ));
    assert_eq!(session.slice_index(), 1);
    assert_eq!(session.display(), &display);
}

#[test]
fn saved_png_reloads_bit_identical() {
    let mut session = session(&[30, 20, 3]);
    session.set_contrast(1.3).unwrap();
    session.rotate_step().unwrap();
    session.set_zoom(1.5).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("view.png");
    session.save(&path, OutputFormat::Png).unwrap();

    let reloaded = export::load_display_buffer(&path).unwrap();
    assert_eq!(&reloaded, session.display());
}

#[test]
fn failed_save_reports_encode_error() {
    let session = session(&[8, 8, 2]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("view.jpg");
    assert!(matches!(
        session.save(&path, OutputFormat::Jpeg),
        Err(SessionError::Encode(_))
    ));
}
