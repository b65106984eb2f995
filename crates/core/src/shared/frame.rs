use ndarray::{ArrayView3, Axis};

/// Clockwise rotation the capture pipeline reports for a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Accepts the four right angles, including negative and >= 360 forms.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// A single camera frame: contiguous interleaved bytes in row-major order.
///
/// Frames are moved into the analyzer and dropped at the end of the cycle,
/// so no pixel buffer outlives the frame that produced it.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    rotation: Rotation,
    index: usize,
}

impl Frame {
    /// The buffer length is not checked here; see [`Frame::is_well_formed`].
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        Self {
            data,
            width,
            height,
            channels,
            rotation: Rotation::Deg0,
            index,
        }
    }

    /// Blank frame of the given geometry, used where only metadata matters.
    pub fn blank(width: u32, height: u32, channels: u8, index: usize) -> Self {
        let len = (width as usize) * (height as usize) * (channels as usize);
        Self::new(vec![0u8; len], width, height, channels, index)
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte length implied by the frame's geometry.
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * (self.channels as usize)
    }

    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// Panics unless [`Frame::is_well_formed`] holds.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Rotates the pixels clockwise by the frame's rotation so the image is
    /// upright. Quarter turns swap width and height.
    ///
    /// Consumes the frame; the pre-rotation buffer is dropped here.
    pub fn into_upright(self) -> Frame {
        if self.rotation == Rotation::Deg0 {
            return self;
        }

        let (data, width, height) = {
            let mut view = self.as_ndarray();
            match self.rotation {
                Rotation::Deg0 => unreachable!(),
                Rotation::Deg90 => {
                    let mut t = view.permuted_axes([1, 0, 2]);
                    t.invert_axis(Axis(1));
                    (t.iter().copied().collect::<Vec<u8>>(), self.height, self.width)
                }
                Rotation::Deg180 => {
                    view.invert_axis(Axis(0));
                    view.invert_axis(Axis(1));
                    (view.iter().copied().collect::<Vec<u8>>(), self.width, self.height)
                }
                Rotation::Deg270 => {
                    let mut t = view.permuted_axes([1, 0, 2]);
                    t.invert_axis(Axis(0));
                    (t.iter().copied().collect::<Vec<u8>>(), self.height, self.width)
                }
            }
        };

        Frame::new(data, width, height, self.channels, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// 3 wide x 2 tall single-channel frame:
    /// ```text
    /// 1 2 3
    /// 4 5 6
    /// ```
    fn numbered(rotation: Rotation) -> Frame {
        Frame::new(vec![1, 2, 3, 4, 5, 6], 3, 2, 1, 7).with_rotation(rotation)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.rotation(), Rotation::Deg0);
        assert_eq!(frame.data(), &data[..]);
    }

    #[rstest]
    #[case::exact(12, true)]
    #[case::short(10, false)]
    #[case::long(13, false)]
    fn test_is_well_formed(#[case] len: usize, #[case] expected: bool) {
        let frame = Frame::new(vec![0u8; len], 2, 2, 3, 0);
        assert_eq!(frame.expected_len(), 12);
        assert_eq!(frame.is_well_formed(), expected);
    }

    #[test]
    fn test_blank_has_expected_length() {
        let frame = Frame::blank(4, 3, 4, 0);
        assert_eq!(frame.data().len(), 48);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, 3, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[rstest]
    #[case(0, Some(Rotation::Deg0))]
    #[case(90, Some(Rotation::Deg90))]
    #[case(180, Some(Rotation::Deg180))]
    #[case(270, Some(Rotation::Deg270))]
    #[case(-90, Some(Rotation::Deg270))]
    #[case(450, Some(Rotation::Deg90))]
    #[case(45, None)]
    fn test_rotation_from_degrees(#[case] degrees: i32, #[case] expected: Option<Rotation>) {
        assert_eq!(Rotation::from_degrees(degrees), expected);
    }

    #[test]
    fn test_upright_without_rotation_is_unchanged() {
        let frame = numbered(Rotation::Deg0).into_upright();
        assert_eq!(frame.data(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!((frame.width(), frame.height()), (3, 2));
    }

    #[test]
    fn test_upright_90_rotates_clockwise() {
        // 4 1
        // 5 2
        // 6 3
        let frame = numbered(Rotation::Deg90).into_upright();
        assert_eq!((frame.width(), frame.height()), (2, 3));
        assert_eq!(frame.data(), &[4, 1, 5, 2, 6, 3]);
        assert_eq!(frame.rotation(), Rotation::Deg0);
        assert_eq!(frame.index(), 7);
    }

    #[test]
    fn test_upright_180() {
        let frame = numbered(Rotation::Deg180).into_upright();
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.data(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_upright_270_rotates_counter_clockwise() {
        // 3 6
        // 2 5
        // 1 4
        let frame = numbered(Rotation::Deg270).into_upright();
        assert_eq!((frame.width(), frame.height()), (2, 3));
        assert_eq!(frame.data(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_upright_keeps_channels_interleaved() {
        // 2x1 RGB: red, blue
        let data = vec![255, 0, 0, 0, 0, 255];
        let frame = Frame::new(data, 2, 1, 3, 0)
            .with_rotation(Rotation::Deg90)
            .into_upright();
        // 1x2: red on top, blue below
        assert_eq!((frame.width(), frame.height()), (1, 2));
        assert_eq!(frame.data(), &[255, 0, 0, 0, 0, 255]);
    }
}
