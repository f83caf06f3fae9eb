use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }
}

/// Axis-aligned integer rectangle. Covers `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Last column inside the rectangle.
    pub fn right(self) -> i32 {
        self.x + self.width - 1
    }

    /// Last row inside the rectangle.
    pub fn bottom(self) -> i32 {
        self.y + self.height - 1
    }

    pub fn area(self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    pub fn center(self) -> Pos {
        Pos { y: self.y + self.height / 2, x: self.x + self.width / 2 }
    }

    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// True when `self` sits inside `outer` leaving at least `margin` cells on every side.
    pub fn inside_with_margin(self, outer: &Self, margin: i32) -> bool {
        self.x >= outer.x + margin
            && self.y >= outer.y + margin
            && self.right() <= outer.right() - margin
            && self.bottom() <= outer.bottom() - margin
    }

    pub fn cells(self) -> impl Iterator<Item = Pos> {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| Pos { y, x }))
    }
}
