use std::fmt;

/// Static per-format shape rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Inclusive lower bound on column count (rectangular formats).
    pub min_breadth: usize,
    /// Inclusive upper bound on column count (rectangular formats).
    pub max_breadth: usize,
    /// True only for the raster format, whose rows vary in length.
    pub jagged: bool,
    /// Number of auxiliary scalar parameters carried by the dataset.
    pub param_count: usize,
}

/// The supported dataset formats.
///
/// All formats except `Raster` are rectangular: every row has the same
/// number of columns, bounded by the format's descriptor. `Raster` is
/// jagged: each row is an independent variable-length run of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Evenly sampled values, one per row; params are origin and interval.
    Series,
    /// Coordinate tuples: x, y and up to four extra columns.
    Points,
    /// Gridded samples; params are the x0/y0/x1/y1 coordinate bounds.
    Field,
    /// Variable-length sample runs; params are origin and interval.
    Raster,
}

impl DataFormat {
    pub fn descriptor(&self) -> FormatDescriptor {
        match self {
            DataFormat::Series => FormatDescriptor {
                min_breadth: 1,
                max_breadth: 1,
                jagged: false,
                param_count: 2,
            },
            DataFormat::Points => FormatDescriptor {
                min_breadth: 2,
                max_breadth: 6,
                jagged: false,
                param_count: 0,
            },
            DataFormat::Field => FormatDescriptor {
                min_breadth: 2,
                max_breadth: 512,
                jagged: false,
                param_count: 4,
            },
            DataFormat::Raster => FormatDescriptor {
                min_breadth: 0,
                max_breadth: usize::MAX,
                jagged: true,
                param_count: 2,
            },
        }
    }

    #[inline]
    pub fn is_jagged(&self) -> bool {
        self.descriptor().jagged
    }

    #[inline]
    pub fn param_count(&self) -> usize {
        self.descriptor().param_count
    }

    /// True if `breadth` is a legal column count for this format.
    /// Jagged datasets have no breadth constraint (their breadth is a
    /// display-only maximum).
    pub fn accepts_breadth(&self, breadth: usize) -> bool {
        let d = self.descriptor();
        d.jagged || (d.min_breadth..=d.max_breadth).contains(&breadth)
    }

    /// Clamp a proposed breadth into this format's bounds.
    pub fn clamp_breadth(&self, breadth: usize) -> usize {
        let d = self.descriptor();
        breadth.clamp(d.min_breadth, d.max_breadth)
    }

    /// Parse a format tag as given on the command line.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "series" => Some(DataFormat::Series),
            "points" => Some(DataFormat::Points),
            "field" => Some(DataFormat::Field),
            "raster" => Some(DataFormat::Raster),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            DataFormat::Series => "series",
            DataFormat::Points => "points",
            DataFormat::Field => "field",
            DataFormat::Raster => "raster",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
