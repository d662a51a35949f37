//! Shape-adaptive wall-kick tables.
//!
//! When a rotated piece does not fit where it is, alternative anchors are
//! tried in the order given by [`kick_offsets`]. The table depends on the
//! shape's [`ShapeClass`] and on the rotation direction.

use arrayvec::ArrayVec;

use crate::core::board::Position;

/// Upper bound on the length of a kick table.
pub const MAX_KICKS: usize = 16;

/// Rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Width and height of the box enclosing a set of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Computes the bounding box of `cells`. An empty set has a zero-sized box.
    #[must_use]
    pub fn of(cells: &[Position]) -> Self {
        let Some(first) = cells.first() else {
            return Self {
                width: 0,
                height: 0,
            };
        };
        let (mut min, mut max) = (*first, *first);
        for cell in cells {
            min.x = min.x.min(cell.x);
            min.y = min.y.min(cell.y);
            max.x = max.x.max(cell.x);
            max.y = max.y.max(cell.y);
        }
        Self {
            width: max.x - min.x + 1,
            height: max.y - min.y + 1,
        }
    }

    #[must_use]
    pub fn longer_side(self) -> i32 {
        self.width.max(self.height)
    }

    #[must_use]
    pub fn is_vertical(self) -> bool {
        self.height > self.width
    }
}

/// Rotation behavior class of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ShapeClass {
    /// 2×2 box with 4 blocks. Needs no kick.
    Square,
    /// Single row or column of blocks.
    Line,
    /// Up to 4 blocks in any other arrangement.
    Standard,
    /// More than 4 blocks in a larger box.
    Complex,
}

impl ShapeClass {
    /// Classifies a shape from its cells.
    #[must_use]
    pub fn classify(cells: &[Position]) -> Self {
        let bbox = BoundingBox::of(cells);
        if bbox.width == 2 && bbox.height == 2 && cells.len() == 4 {
            Self::Square
        } else if bbox.width == 1 || bbox.height == 1 {
            Self::Line
        } else if cells.len() <= 4 {
            Self::Standard
        } else {
            Self::Complex
        }
    }
}

const fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

/// Builds the ordered list of anchor offsets to try for a rotation.
///
/// `before` and `after` are the bounding boxes of the shape before and after
/// the rotation. The identity offset always comes first.
#[must_use]
pub fn kick_offsets(
    class: ShapeClass,
    before: BoundingBox,
    after: BoundingBox,
    direction: RotationDirection,
) -> ArrayVec<Position, MAX_KICKS> {
    let mut kicks = ArrayVec::new();
    kicks.push(p(0, 0));
    let toward = |n: i32| match direction {
        RotationDirection::Clockwise => [p(n, 0), p(-n, 0)],
        RotationDirection::CounterClockwise => [p(-n, 0), p(n, 0)],
    };

    match class {
        ShapeClass::Square => {}
        ShapeClass::Line => {
            let horizontal = [p(-1, 0), p(1, 0), p(-2, 0), p(2, 0)];
            let vertical = [p(0, -1), p(0, -2)];
            let becoming_vertical = !before.is_vertical() && after.is_vertical();
            if becoming_vertical {
                kicks.extend(vertical);
                kicks.extend(horizontal);
            } else {
                kicks.extend(horizontal);
                kicks.extend(vertical);
            }
            kicks.extend([p(-1, -1), p(1, -1)]);
        }
        ShapeClass::Standard | ShapeClass::Complex => {
            kicks.extend([p(-1, 0), p(1, 0), p(0, -1), p(-1, -1), p(1, -1)]);
            kicks.extend(toward(2));
            if class.is_complex() && after.longer_side() > 3 {
                kicks.extend(toward(3));
                kicks.extend([p(0, -3), p(0, 3)]);
            }
        }
    }
    kicks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockColor, BlockStore, PieceKind, PieceRotation};

    fn cells(kind: PieceKind, turns: u8) -> Vec<Position> {
        BlockStore::new()
            .create_piece(kind, BlockColor::Dough, Position::ORIGIN)
            .cell_offsets(PieceRotation::new(turns))
            .to_vec()
    }

    fn bbox(width: i32, height: i32) -> BoundingBox {
        BoundingBox { width, height }
    }

    #[test]
    fn test_classify_tetrominoes() {
        assert_eq!(ShapeClass::classify(&cells(PieceKind::O, 0)), ShapeClass::Square);
        assert_eq!(ShapeClass::classify(&cells(PieceKind::I, 0)), ShapeClass::Line);
        assert_eq!(ShapeClass::classify(&cells(PieceKind::I, 1)), ShapeClass::Line);
        for kind in [PieceKind::T, PieceKind::S, PieceKind::Z, PieceKind::J, PieceKind::L] {
            for turns in 0..4 {
                assert_eq!(
                    ShapeClass::classify(&cells(kind, turns)),
                    ShapeClass::Standard,
                    "{kind:?} rotation {turns}"
                );
            }
        }
    }

    #[test]
    fn test_classify_larger_shapes() {
        // Pentomino "P": 2×3 box with 5 blocks
        let pentomino = [p(0, 0), p(1, 0), p(0, 1), p(1, 1), p(0, 2)];
        assert_eq!(ShapeClass::classify(&pentomino), ShapeClass::Complex);

        // 2×2 box with only 3 blocks is not a square
        let corner = [p(0, 0), p(1, 0), p(0, 1)];
        assert_eq!(ShapeClass::classify(&corner), ShapeClass::Standard);

        // Long bar of 5 is still a line
        let bar: Vec<_> = (0..5).map(|x| p(x, 0)).collect();
        assert_eq!(ShapeClass::classify(&bar), ShapeClass::Line);
    }

    #[test]
    fn test_bounding_box() {
        assert_eq!(BoundingBox::of(&cells(PieceKind::I, 0)), bbox(4, 1));
        assert_eq!(BoundingBox::of(&cells(PieceKind::I, 1)), bbox(1, 4));
        assert_eq!(BoundingBox::of(&cells(PieceKind::T, 0)), bbox(3, 2));
        assert_eq!(BoundingBox::of(&[]), bbox(0, 0));
    }

    #[test]
    fn test_square_only_tries_identity() {
        let kicks = kick_offsets(
            ShapeClass::Square,
            bbox(2, 2),
            bbox(2, 2),
            RotationDirection::Clockwise,
        );
        assert_eq!(kicks.as_slice(), &[p(0, 0)]);
    }

    #[test]
    fn test_standard_kicks_favor_rotation_direction() {
        let cw = kick_offsets(
            ShapeClass::Standard,
            bbox(3, 2),
            bbox(2, 3),
            RotationDirection::Clockwise,
        );
        assert_eq!(
            cw.as_slice(),
            &[
                p(0, 0),
                p(-1, 0),
                p(1, 0),
                p(0, -1),
                p(-1, -1),
                p(1, -1),
                p(2, 0),
                p(-2, 0),
            ]
        );

        let ccw = kick_offsets(
            ShapeClass::Standard,
            bbox(3, 2),
            bbox(2, 3),
            RotationDirection::CounterClockwise,
        );
        assert_eq!(&ccw[..6], &cw[..6]);
        assert_eq!(&ccw[6..], &[p(-2, 0), p(2, 0)]);
    }

    #[test]
    fn test_line_becoming_vertical_tries_vertical_first() {
        let kicks = kick_offsets(
            ShapeClass::Line,
            bbox(4, 1),
            bbox(1, 4),
            RotationDirection::Clockwise,
        );
        assert_eq!(
            kicks.as_slice(),
            &[
                p(0, 0),
                p(0, -1),
                p(0, -2),
                p(-1, 0),
                p(1, 0),
                p(-2, 0),
                p(2, 0),
                p(-1, -1),
                p(1, -1),
            ]
        );
    }

    #[test]
    fn test_line_becoming_horizontal_tries_horizontal_first() {
        let kicks = kick_offsets(
            ShapeClass::Line,
            bbox(1, 4),
            bbox(4, 1),
            RotationDirection::CounterClockwise,
        );
        assert_eq!(
            kicks.as_slice(),
            &[
                p(0, 0),
                p(-1, 0),
                p(1, 0),
                p(-2, 0),
                p(2, 0),
                p(0, -1),
                p(0, -2),
                p(-1, -1),
                p(1, -1),
            ]
        );
    }

    #[test]
    fn test_complex_kicks_extend_for_long_shapes() {
        let short = kick_offsets(
            ShapeClass::Complex,
            bbox(2, 3),
            bbox(3, 2),
            RotationDirection::Clockwise,
        );
        assert_eq!(short.len(), 8);

        let long = kick_offsets(
            ShapeClass::Complex,
            bbox(2, 4),
            bbox(4, 2),
            RotationDirection::CounterClockwise,
        );
        let standard = kick_offsets(
            ShapeClass::Standard,
            bbox(2, 4),
            bbox(4, 2),
            RotationDirection::CounterClockwise,
        );
        assert_eq!(&long[..8], &standard[..]);
        assert_eq!(&long[8..], &[p(-3, 0), p(3, 0), p(0, -3), p(0, 3)]);
    }

    #[test]
    fn test_identity_always_first() {
        for class in [
            ShapeClass::Square,
            ShapeClass::Line,
            ShapeClass::Standard,
            ShapeClass::Complex,
        ] {
            for direction in [RotationDirection::Clockwise, RotationDirection::CounterClockwise] {
                let kicks = kick_offsets(class, bbox(3, 4), bbox(4, 3), direction);
                assert_eq!(kicks[0], Position::ORIGIN);
            }
        }
    }
}
