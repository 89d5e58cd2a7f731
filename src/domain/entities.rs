//! Domain entities: points, regions and quadrant labels

use std::fmt;

/// Immutable 2D coordinate.
///
/// Points are created once from input and never mutated. Tree nodes refer to
/// them by position in the tree's point list, so a point shared by several
/// leaves is stored exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Coordinate axis, used when reporting degenerate bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// One of the four equal sub-rectangles of a split region.
///
/// The declaration order is the order children are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NW,
    NE,
    SE,
    SW,
}

impl Quadrant {
    /// All quadrants in child storage order.
    pub const ALL: [Quadrant; 4] = [Quadrant::NW, Quadrant::NE, Quadrant::SE, Quadrant::SW];

    /// Position of this quadrant in a node's children array.
    pub const fn slot(self) -> usize {
        match self {
            Quadrant::NW => 0,
            Quadrant::NE => 1,
            Quadrant::SE => 2,
            Quadrant::SW => 3,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quadrant::NW => "NW",
            Quadrant::NE => "NE",
            Quadrant::SE => "SE",
            Quadrant::SW => "SW",
        };
        f.write_str(label)
    }
}

/// Axis-aligned rectangle described by its lower-left origin and extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub const fn new(x0: f64, y0: f64, width: f64, height: f64) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    pub fn x1(&self) -> f64 {
        self.x0 + self.width
    }

    /// Top edge.
    #[inline]
    pub fn y1(&self) -> f64 {
        self.y0 + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Boundary-inclusive membership test on all four sides.
    ///
    /// A point on the line shared by two adjacent regions is contained by
    /// both of them.
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x0 && p.x <= self.x0 + self.width && p.y >= self.y0 && p.y <= self.y0 + self.height
    }

    /// Sub-rectangle of half width and half height for the given quadrant.
    pub fn quadrant(&self, quadrant: Quadrant) -> Region {
        let w = self.width / 2.0;
        let h = self.height / 2.0;
        match quadrant {
            Quadrant::SW => Region::new(self.x0, self.y0, w, h),
            Quadrant::NW => Region::new(self.x0, self.y0 + h, w, h),
            Quadrant::SE => Region::new(self.x0 + w, self.y0, w, h),
            Quadrant::NE => Region::new(self.x0 + w, self.y0 + h, w, h),
        }
    }

    /// True if both split lines fall strictly inside the region.
    ///
    /// Fails once an extent drops below the float spacing at `x0`/`y0`, where
    /// halving would give quadrants equal to the region itself.
    pub fn can_split(&self) -> bool {
        let mx = self.x0 + self.width / 2.0;
        let my = self.y0 + self.height / 2.0;
        self.x0 < mx && mx < self.x1() && self.y0 < my && my < self.y1()
    }

    /// The four quadrants in child storage order (NW, NE, SE, SW).
    pub fn quadrants(&self) -> [Region; 4] {
        Quadrant::ALL.map(|q| self.quadrant(q))
    }

    /// True if the open interiors of both regions intersect.
    pub fn overlaps_interior(&self, other: &Region) -> bool {
        self.x0 < other.x1() && other.x0 < self.x1() && self.y0 < other.y1() && other.y0 < self.y1()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.6}, {:.6}] x [{:.6}, {:.6}]",
            self.x0,
            self.x1(),
            self.y0,
            self.y1()
        )
    }
}
