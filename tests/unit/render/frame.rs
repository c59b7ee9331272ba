use super::*;

#[test]
fn filled_frame_has_canvas_size() {
    let canvas = Canvas::new(4, 2).unwrap();
    let f = Frame::filled(FrameIndex(7), canvas, [1, 2, 3, 255]);
    assert_eq!(f.data.len(), 4 * 2 * 4);
    assert_eq!(f.canvas(), canvas);
    assert_eq!(f.pixel(3, 1), [1, 2, 3, 255]);
    assert_eq!(f.index, FrameIndex(7));
}

#[test]
fn from_rgba_checks_length() {
    assert!(Frame::from_rgba(FrameIndex(0), 2, 2, vec![0; 15]).is_err());
    let f = Frame::from_rgba(FrameIndex(0), 2, 2, vec![9; 16]).unwrap();
    assert_eq!(f.pixel(1, 1), [9, 9, 9, 9]);
}

#[test]
fn rows_mut_yields_one_slice_per_row() {
    let mut f = Frame::filled(FrameIndex(0), Canvas::new(3, 5).unwrap(), [0, 0, 0, 255]);
    let rows: Vec<usize> = f.rows_mut().map(|r| r.len()).collect();
    assert_eq!(rows, vec![12; 5]);
}
